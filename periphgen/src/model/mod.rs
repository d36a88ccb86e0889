//! In-memory model of a peripheral description document.
//!
//! Everything here is a plain value object owned by [`PeripheralConfig`].
//! The parser builds it, the analyzer and normalizer only read it.

pub mod comm;
pub mod defaults;
pub mod keyword;
pub mod pin;
pub mod timer;

pub use comm::{
    AddressingMode, DutyCycle, FlowControl, I2cConfig, Parity, StopBits, UartConfig, WordLength,
};
pub use keyword::{Choice, Keyword};
pub use pin::{AltFunction, Direction, PinConfig, PinId, PinIdError, Pull, Speed};
pub use timer::{ClockDivision, CounterMode, TimerConfig, TimerMode};

use serde::Serialize;
use std::fmt;

/// STM32 series with a Cube HAL package.
pub const HAL_SERIES: &[&str] = &[
    "C0", "F0", "F1", "F2", "F3", "F4", "F7", "G0", "G4", "H5", "H7", "L0", "L1", "L4", "L5",
    "U5", "WB", "WL",
];

/// Series whose I2C HAL is configured through `ClockSpeed`/`DutyCycle`.
/// The rest program the bus through a precomputed `Init.Timing` word.
pub const I2C_CLOCK_SPEED_SERIES: &[&str] = &["F1", "F2", "F4", "L1"];

/// Board-level information from the optional `board` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoardConfig {
    pub name: Option<String>,
    pub mcu: Option<String>,
    /// Timer input clock in Hz.
    pub clock_freq: Option<i64>,
}

impl BoardConfig {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(defaults::BOARD_NAME)
    }

    /// HAL family of the configured MCU, e.g. `stm32f4xx` for `STM32F407VG`.
    ///
    /// `None` when no MCU is given or its family is not one the HAL ships.
    pub fn hal_family(&self) -> Option<String> {
        let series = self.series()?;
        Some(format!("stm32{}xx", series.to_ascii_lowercase()))
    }

    /// Two-letter series code (`F4`, `G4`, ...) of a recognized MCU.
    pub fn series(&self) -> Option<String> {
        let mcu = self.mcu.as_deref()?.trim().to_ascii_uppercase();
        let series = mcu.strip_prefix("STM32")?.get(..2)?;
        if !HAL_SERIES.contains(&series) {
            return None;
        }
        Some(series.to_string())
    }

    /// Whether the generated `ClockSpeed` style I2C init applies. Unknown
    /// MCUs fall back to the F4 header, which does.
    pub fn i2c_uses_clock_speed(&self) -> bool {
        match self.series() {
            Some(series) => I2C_CLOCK_SPEED_SERIES.contains(&series.as_str()),
            None => true,
        }
    }

    pub fn timer_clock_hz(&self) -> i64 {
        match self.clock_freq {
            Some(hz) if hz > 0 => hz,
            _ => defaults::TIMER_CLOCK_HZ,
        }
    }
}

/// Root aggregate of one parsed document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeripheralConfig {
    pub board: BoardConfig,
    pub pins: Vec<PinConfig>,
    pub uarts: Vec<UartConfig>,
    pub i2cs: Vec<I2cConfig>,
    pub timers: Vec<TimerConfig>,
}

impl PeripheralConfig {
    /// Every entity in document order: pins, UARTs, I2C buses, timers.
    pub fn peripherals(&self) -> impl Iterator<Item = (PeripheralRef, Peripheral<'_>)> {
        let pins = self
            .pins
            .iter()
            .enumerate()
            .map(|(i, p)| Peripheral::Pin(p).at(i));
        let uarts = self
            .uarts
            .iter()
            .enumerate()
            .map(|(i, u)| Peripheral::Uart(u).at(i));
        let i2cs = self
            .i2cs
            .iter()
            .enumerate()
            .map(|(i, c)| Peripheral::I2c(c).at(i));
        let timers = self
            .timers
            .iter()
            .enumerate()
            .map(|(i, t)| Peripheral::Timer(t).at(i));
        pins.chain(uarts).chain(i2cs).chain(timers)
    }

    /// Pin entries matching a pin reference such as `PA9`.
    pub fn find_pins<'a>(&'a self, reference: &'a str) -> impl Iterator<Item = (usize, &'a PinConfig)> + 'a {
        self.pins
            .iter()
            .enumerate()
            .filter(move |(_, pin)| pin.matches(reference))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeripheralKind {
    Board,
    Pin,
    Uart,
    I2c,
    Timer,
}

impl PeripheralKind {
    /// Document section holding entities of this kind.
    pub fn section(self) -> &'static str {
        match self {
            PeripheralKind::Board => "board",
            PeripheralKind::Pin => "gpio.pins",
            PeripheralKind::Uart => "communication.uart",
            PeripheralKind::I2c => "communication.i2c",
            PeripheralKind::Timer => "timers",
        }
    }
}

/// Points at one entity of the document, e.g. `gpio.pins[3] (PA9)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PeripheralRef {
    pub kind: PeripheralKind,
    pub index: usize,
    pub name: String,
}

impl PeripheralRef {
    pub fn new(kind: PeripheralKind, index: usize, name: impl Into<String>) -> Self {
        Self {
            kind,
            index,
            name: name.into(),
        }
    }

    pub fn board(config: &PeripheralConfig) -> Self {
        Self::new(PeripheralKind::Board, 0, config.board.display_name())
    }

    pub fn path(&self) -> String {
        match self.kind {
            PeripheralKind::Board => self.kind.section().to_string(),
            kind => format!("{}[{}]", kind.section(), self.index),
        }
    }

    pub fn field(&self, field: &str) -> String {
        format!("{}.{}", self.path(), field)
    }
}

impl fmt::Display for PeripheralRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path(), self.name)
    }
}

/// Tagged view over the entities of a [`PeripheralConfig`].
#[derive(Debug, Clone, Copy)]
pub enum Peripheral<'a> {
    Pin(&'a PinConfig),
    Uart(&'a UartConfig),
    I2c(&'a I2cConfig),
    Timer(&'a TimerConfig),
}

impl<'a> Peripheral<'a> {
    pub fn kind(&self) -> PeripheralKind {
        match self {
            Peripheral::Pin(_) => PeripheralKind::Pin,
            Peripheral::Uart(_) => PeripheralKind::Uart,
            Peripheral::I2c(_) => PeripheralKind::I2c,
            Peripheral::Timer(_) => PeripheralKind::Timer,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            Peripheral::Pin(p) => &p.pin,
            Peripheral::Uart(u) => &u.instance,
            Peripheral::I2c(c) => &c.instance,
            Peripheral::Timer(t) => &t.instance,
        }
    }

    /// Pins have no enable switch; they are always configured.
    pub fn is_enabled(&self) -> bool {
        match self {
            Peripheral::Pin(_) => true,
            Peripheral::Uart(u) => u.enabled,
            Peripheral::I2c(c) => c.enabled,
            Peripheral::Timer(t) => t.enabled,
        }
    }

    fn at(self, index: usize) -> (PeripheralRef, Peripheral<'a>) {
        (PeripheralRef::new(self.kind(), index, self.name()), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(mcu: &str) -> BoardConfig {
        BoardConfig {
            mcu: Some(mcu.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_hal_family() {
        assert_eq!(board("STM32F407VG").hal_family().as_deref(), Some("stm32f4xx"));
        assert_eq!(board("stm32g474re").hal_family().as_deref(), Some("stm32g4xx"));
        assert_eq!(board("STM32Q999").hal_family(), None);
        assert_eq!(board("ATmega328P").hal_family(), None);
        assert_eq!(BoardConfig::default().hal_family(), None);
    }

    #[test]
    fn test_i2c_init_style_by_series() {
        assert!(board("STM32F407VG").i2c_uses_clock_speed());
        assert!(board("STM32F103C8").i2c_uses_clock_speed());
        assert!(!board("STM32G474RE").i2c_uses_clock_speed());
        assert!(!board("STM32L476RG").i2c_uses_clock_speed());
        assert!(BoardConfig::default().i2c_uses_clock_speed());
        assert_eq!(board("stm32h743zi").series().as_deref(), Some("H7"));
    }

    #[test]
    fn test_timer_clock_falls_back_on_bad_values() {
        let mut board = BoardConfig::default();
        assert_eq!(board.timer_clock_hz(), defaults::TIMER_CLOCK_HZ);
        board.clock_freq = Some(-5);
        assert_eq!(board.timer_clock_hz(), defaults::TIMER_CLOCK_HZ);
        board.clock_freq = Some(168_000_000);
        assert_eq!(board.timer_clock_hz(), 168_000_000);
    }

    #[test]
    fn test_peripheral_ref_paths() {
        let at = PeripheralRef::new(PeripheralKind::Uart, 1, "USART2");
        assert_eq!(at.path(), "communication.uart[1]");
        assert_eq!(at.field("baudrate"), "communication.uart[1].baudrate");
        assert_eq!(at.to_string(), "communication.uart[1] (USART2)");
    }
}
