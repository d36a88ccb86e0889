//! Human and JSON overview of a parsed configuration.

use crate::model::{Keyword, Peripheral, PeripheralConfig, PeripheralKind};
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Serialize)]
pub struct BoardSummary {
    pub name: String,
    pub mcu: Option<String>,
    pub clock_freq: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryEntry {
    pub kind: PeripheralKind,
    pub name: String,
    pub enabled: bool,
    #[serde(serialize_with = "ordered_details")]
    pub details: Vec<(&'static str, String)>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct KindTotal {
    pub kind: PeripheralKind,
    pub configured: usize,
    pub enabled: usize,
}

/// Every configured entity, disabled ones included, with per-kind counts.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub board: BoardSummary,
    pub entries: Vec<SummaryEntry>,
    pub totals: Vec<KindTotal>,
}

const KINDS: [PeripheralKind; 4] = [
    PeripheralKind::Pin,
    PeripheralKind::Uart,
    PeripheralKind::I2c,
    PeripheralKind::Timer,
];

fn or_na<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "n/a".to_string())
}

fn details(peripheral: &Peripheral<'_>) -> Vec<(&'static str, String)> {
    match peripheral {
        Peripheral::Pin(pin) => {
            let direction = match &pin.direction {
                Some(choice) => choice.to_string(),
                None => pin
                    .effective_direction()
                    .map(|d| d.keyword().to_string())
                    .unwrap_or_default(),
            };
            let mut details = vec![
                ("dir", direction),
                ("pull", pin.pull.to_string()),
                ("speed", pin.speed.to_string()),
            ];
            if let Some(af) = &pin.alt_function {
                details.push(("alt_fn", af.clone()));
            }
            if pin.shared {
                details.push(("shared", "yes".to_string()));
            }
            details
        }
        Peripheral::Uart(uart) => vec![
            ("baud", or_na(uart.baudrate)),
            ("tx", or_na(uart.tx_pin.as_deref())),
            ("rx", or_na(uart.rx_pin.as_deref())),
        ],
        Peripheral::I2c(i2c) => vec![
            ("speed", format!("{} hz", i2c.speed)),
            ("scl", or_na(i2c.scl_pin.as_deref())),
            ("sda", or_na(i2c.sda_pin.as_deref())),
        ],
        Peripheral::Timer(timer) => {
            let mut details = vec![
                ("mode", timer.mode.to_string()),
                ("presc", or_na(timer.prescaler)),
                ("period", or_na(timer.period)),
            ];
            if let Some(channel) = timer.channel {
                details.push(("channel", channel.to_string()));
            }
            if let Some(duty) = timer.duty_cycle {
                details.push(("duty", format!("{}%", duty)));
            }
            details
        }
    }
}

fn ordered_details<S: Serializer>(
    details: &[(&'static str, String)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(details.iter().map(|(key, value)| (key, value)))
}

impl Summary {
    pub fn from_config(config: &PeripheralConfig) -> Self {
        let entries: Vec<SummaryEntry> = config
            .peripherals()
            .map(|(at, peripheral)| SummaryEntry {
                kind: at.kind,
                name: at.name,
                enabled: peripheral.is_enabled(),
                details: details(&peripheral),
            })
            .collect();

        let totals = KINDS
            .iter()
            .map(|&kind| {
                let of_kind = entries.iter().filter(|e| e.kind == kind);
                KindTotal {
                    kind,
                    configured: of_kind.clone().count(),
                    enabled: of_kind.filter(|e| e.enabled).count(),
                }
            })
            .collect();

        Self {
            board: BoardSummary {
                name: config.board.display_name().to_string(),
                mcu: config.board.mcu.clone(),
                clock_freq: config.board.clock_freq,
            },
            entries,
            totals,
        }
    }

    pub fn total(&self, kind: PeripheralKind) -> Option<KindTotal> {
        self.totals.iter().copied().find(|t| t.kind == kind)
    }
}

fn heading(kind: PeripheralKind) -> &'static str {
    match kind {
        PeripheralKind::Board => "board",
        PeripheralKind::Pin => "gpio pins",
        PeripheralKind::Uart => "uart",
        PeripheralKind::I2c => "i2c",
        PeripheralKind::Timer => "timers",
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- config summary ---")?;
        writeln!(f, "board     : {}", self.board.name)?;
        writeln!(f, "mcu       : {}", self.board.mcu.as_deref().unwrap_or("n/a"))?;
        match self.board.clock_freq {
            Some(hz) => writeln!(f, "sysclock  : {} hz", hz)?,
            None => writeln!(f, "sysclock  : n/a")?,
        }

        for total in &self.totals {
            if total.configured == 0 {
                continue;
            }
            writeln!(f)?;
            if total.kind == PeripheralKind::Pin {
                writeln!(f, "{} ({})", heading(total.kind), total.configured)?;
            } else {
                writeln!(
                    f,
                    "{} ({}, {} enabled)",
                    heading(total.kind),
                    total.configured,
                    total.enabled
                )?;
            }
            for entry in self.entries.iter().filter(|e| e.kind == total.kind) {
                let details: Vec<String> = entry
                    .details
                    .iter()
                    .map(|(key, value)| format!("{} {}", key, value))
                    .collect();
                if entry.kind == PeripheralKind::Pin {
                    writeln!(f, "  {:<5} | {}", entry.name, details.join(" | "))?;
                } else {
                    let status = if entry.enabled { "on" } else { "off" };
                    writeln!(f, "  {}: {}, {}", entry.name, status, details.join(", "))?;
                }
            }
        }
        write!(f, "--- end summary ---")
    }
}
