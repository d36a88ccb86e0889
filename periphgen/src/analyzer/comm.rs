//! UART and I2C rules, plus the cross-check of the pins they reference.

use super::rules::{Issue, Rule};
use super::{duplicate_instances, instance_number, unknown_keyword};
use crate::model::{
    AddressingMode, AltFunction, Direction, DutyCycle, FlowControl, Keyword, PeripheralConfig,
    PeripheralKind, PeripheralRef, StopBits, WordLength,
};
use std::collections::HashMap;

pub const MAX_BAUD_RATE: i64 = 10_500_000;
pub const STANDARD_BAUD_RATES: &[i64] = &[
    1_200, 2_400, 4_800, 9_600, 14_400, 19_200, 38_400, 57_600, 115_200, 230_400, 460_800,
    921_600, 1_000_000, 2_000_000, 3_000_000,
];
pub const I2C_STANDARD_MODE_MAX_HZ: i64 = 100_000;
pub const I2C_FAST_MODE_MAX_HZ: i64 = 400_000;

const UART_PREFIXES: &[&str] = &["USART", "UART"];
const I2C_PREFIXES: &[&str] = &["I2C"];

pub struct UartSettingsRule;

impl Rule for UartSettingsRule {
    fn id(&self) -> &str {
        "uart_settings"
    }

    fn name(&self) -> &str {
        "UART settings"
    }

    fn description(&self) -> &str {
        "Instance name, baud rate 1..=10.5 Mbit/s, 8/9 data bits, 1/2 stop bits, parity and flow control"
    }

    fn check(&self, config: &PeripheralConfig) -> Vec<Issue> {
        let mut issues = Vec::new();
        for (index, uart) in config.uarts.iter().enumerate() {
            let at = PeripheralRef::new(PeripheralKind::Uart, index, &uart.instance);

            if instance_number(&uart.instance, UART_PREFIXES).is_none() {
                issues.push(
                    Issue::error(
                        self.id(),
                        &at,
                        format!("`{}` is not a UART instance (expected USART<n> or UART<n>)", uart.instance),
                    )
                    .at("instance"),
                );
            }

            match uart.baudrate {
                None if uart.enabled => issues.push(
                    Issue::error(self.id(), &at, format!("enabled {} has no baud rate", uart.instance))
                        .at("baudrate"),
                ),
                None => {}
                Some(baud) if baud <= 0 => issues.push(
                    Issue::error(
                        self.id(),
                        &at,
                        format!("baud rate must be positive, got {}", baud),
                    )
                    .at("baudrate"),
                ),
                Some(baud) if baud > MAX_BAUD_RATE => issues.push(
                    Issue::error(
                        self.id(),
                        &at,
                        format!("baud rate {} exceeds the {} hardware limit", baud, MAX_BAUD_RATE),
                    )
                    .at("baudrate"),
                ),
                Some(baud) if !STANDARD_BAUD_RATES.contains(&baud) => issues.push(
                    Issue::warning(self.id(), &at, format!("baud rate {} is not a standard rate", baud))
                        .at("baudrate")
                        .suggest("Common rates are 9600, 57600, 115200 and 921600"),
                ),
                Some(_) => {}
            }

            if WordLength::from_bits(uart.data_bits).is_none() {
                issues.push(
                    Issue::error(
                        self.id(),
                        &at,
                        format!("data bits must be 8 or 9, got {}", uart.data_bits),
                    )
                    .at("data_bits"),
                );
            }
            if StopBits::from_count(uart.stop_bits).is_none() {
                issues.push(
                    Issue::error(
                        self.id(),
                        &at,
                        format!("stop bits must be 1 or 2, got {}", uart.stop_bits),
                    )
                    .at("stop_bits"),
                );
            }
            issues.extend(unknown_keyword(self.id(), &at, "parity", &uart.parity));
            issues.extend(unknown_keyword(self.id(), &at, "flow_control", &uart.flow_control));

            // UART4/UART5 have no RTS/CTS lines.
            let flow = uart.flow_control.known();
            if uart.instance.starts_with("UART") && flow.is_some() && flow != Some(FlowControl::None) {
                issues.push(
                    Issue::error(
                        self.id(),
                        &at,
                        format!("{} has no hardware flow control lines", uart.instance),
                    )
                    .at("flow_control"),
                );
            }
        }

        issues.extend(duplicate_instances(
            self.id(),
            PeripheralKind::Uart,
            UART_PREFIXES,
            config.uarts.iter().map(|u| u.instance.as_str()),
        ));
        issues
    }
}

pub struct I2cSettingsRule;

impl Rule for I2cSettingsRule {
    fn id(&self) -> &str {
        "i2c_settings"
    }

    fn name(&self) -> &str {
        "I2C settings"
    }

    fn description(&self) -> &str {
        "Instance name, clock speed within standard/fast mode (400 kHz), addressing mode and own address range"
    }

    fn check(&self, config: &PeripheralConfig) -> Vec<Issue> {
        let mut issues = Vec::new();
        for (index, i2c) in config.i2cs.iter().enumerate() {
            let at = PeripheralRef::new(PeripheralKind::I2c, index, &i2c.instance);

            if instance_number(&i2c.instance, I2C_PREFIXES).is_none() {
                issues.push(
                    Issue::error(
                        self.id(),
                        &at,
                        format!("`{}` is not an I2C instance (expected I2C<n>)", i2c.instance),
                    )
                    .at("instance"),
                );
            }

            if i2c.speed <= 0 {
                issues.push(
                    Issue::error(
                        self.id(),
                        &at,
                        format!("clock speed must be positive, got {}", i2c.speed),
                    )
                    .at("speed"),
                );
            } else if i2c.speed > I2C_FAST_MODE_MAX_HZ {
                issues.push(
                    Issue::error(
                        self.id(),
                        &at,
                        format!(
                            "clock speed {} Hz exceeds the fast-mode limit of {} Hz",
                            i2c.speed, I2C_FAST_MODE_MAX_HZ
                        ),
                    )
                    .at("speed"),
                );
            }

            issues.extend(unknown_keyword(self.id(), &at, "addressing_mode", &i2c.addressing_mode));
            issues.extend(unknown_keyword(self.id(), &at, "duty_cycle", &i2c.duty_cycle));

            if let Some(mode) = i2c.addressing_mode.known() {
                if i2c.own_address < 0 || i2c.own_address > mode.max_address() {
                    issues.push(
                        Issue::error(
                            self.id(),
                            &at,
                            format!(
                                "own address {:#x} does not fit {} addressing (max {:#x})",
                                i2c.own_address,
                                mode.keyword(),
                                mode.max_address()
                            ),
                        )
                        .at("own_address"),
                    );
                } else if mode == AddressingMode::SevenBit
                    && i2c.own_address != 0
                    && (i2c.own_address <= 0x07 || i2c.own_address >= 0x78)
                {
                    issues.push(
                        Issue::warning(
                            self.id(),
                            &at,
                            format!("own address {:#x} is in a reserved 7-bit range", i2c.own_address),
                        )
                        .at("own_address"),
                    );
                }
            }

            if i2c.duty_cycle.is(DutyCycle::SixteenNine) && i2c.speed <= I2C_STANDARD_MODE_MAX_HZ {
                issues.push(
                    Issue::warning(
                        self.id(),
                        &at,
                        "duty cycle 16_9 only applies in fast mode (above 100 kHz)",
                    )
                    .at("duty_cycle"),
                );
            }
        }

        issues.extend(duplicate_instances(
            self.id(),
            PeripheralKind::I2c,
            I2C_PREFIXES,
            config.i2cs.iter().map(|c| c.instance.as_str()),
        ));
        issues
    }
}

/// Signal lines an enabled communication peripheral needs.
struct PinRoles<'a> {
    owner: PeripheralRef,
    is_i2c: bool,
    roles: [(&'static str, Option<&'a String>); 2],
}

fn pin_roles(config: &PeripheralConfig) -> Vec<PinRoles<'_>> {
    let uarts = config
        .uarts
        .iter()
        .enumerate()
        .filter(|(_, u)| u.enabled)
        .map(|(i, u)| PinRoles {
            owner: PeripheralRef::new(PeripheralKind::Uart, i, &u.instance),
            is_i2c: false,
            roles: [("tx_pin", u.tx_pin.as_ref()), ("rx_pin", u.rx_pin.as_ref())],
        });
    let i2cs = config
        .i2cs
        .iter()
        .enumerate()
        .filter(|(_, c)| c.enabled)
        .map(|(i, c)| PinRoles {
            owner: PeripheralRef::new(PeripheralKind::I2c, i, &c.instance),
            is_i2c: true,
            roles: [("scl_pin", c.scl_pin.as_ref()), ("sda_pin", c.sda_pin.as_ref())],
        });
    uarts.chain(i2cs).collect()
}

pub struct PinReferenceRule;

impl Rule for PinReferenceRule {
    fn id(&self) -> &str {
        "pin_reference"
    }

    fn name(&self) -> &str {
        "Pin references"
    }

    fn description(&self) -> &str {
        "Enabled UART/I2C instances reference declared alternate-function pins, each claimed once"
    }

    fn check(&self, config: &PeripheralConfig) -> Vec<Issue> {
        let mut issues = Vec::new();
        let mut claims: HashMap<String, (PeripheralRef, &'static str)> = HashMap::new();

        for entry in pin_roles(config) {
            let owner = &entry.owner;
            // A UART may run transmit-only or receive-only; I2C needs both lines.
            if !entry.is_i2c && entry.roles.iter().all(|(_, reference)| reference.is_none()) {
                issues.push(
                    Issue::error(
                        self.id(),
                        owner,
                        format!("enabled {} has neither tx_pin nor rx_pin", owner.name),
                    )
                    .at("tx_pin"),
                );
            }
            for (role, reference) in entry.roles {
                let Some(name) = reference else {
                    if entry.is_i2c {
                        issues.push(
                            Issue::error(
                                self.id(),
                                owner,
                                format!("enabled {} has no {}", owner.name, role),
                            )
                            .at(role),
                        );
                    }
                    continue;
                };

                let declared: Vec<_> = config.find_pins(name).collect();
                let Some(&(pin_index, pin)) = declared.first() else {
                    issues.push(
                        Issue::error(
                            self.id(),
                            owner,
                            format!("{} {} is not declared under gpio.pins", role, name),
                        )
                        .at(role)
                        .suggest(format!("Add {} with the matching alt_function to gpio.pins", name)),
                    );
                    continue;
                };
                let pin_at = PeripheralRef::new(PeripheralKind::Pin, pin_index, &pin.pin);

                if !declared.iter().any(|(_, p)| p.has_alternate_role()) {
                    let declared_as = pin
                        .effective_direction()
                        .map(Direction::keyword)
                        .unwrap_or("an unknown direction");
                    issues.push(
                        Issue::error(
                            self.id(),
                            owner,
                            format!(
                                "{} {} must be an alternate-function pin but is declared as {}",
                                role, name, declared_as
                            ),
                        )
                        .at(role)
                        .related_to(&pin_at),
                    );
                } else if let Some(af) = pin.alt_function.as_deref().and_then(AltFunction::parse) {
                    if af.target != owner.name {
                        issues.push(
                            Issue::warning(
                                self.id(),
                                owner,
                                format!(
                                    "{} routes its alternate function to {}, not {}",
                                    name, af.target, owner.name
                                ),
                            )
                            .at(role)
                            .related_to(&pin_at),
                        );
                    }
                }

                if entry.is_i2c && pin.effective_direction() == Some(Direction::Alternate) {
                    issues.push(
                        Issue::warning(
                            self.id(),
                            &pin_at,
                            format!("{} line {} is push-pull; I2C lines are open-drain", owner.name, name),
                        )
                        .at("direction")
                        .suggest("Use direction: alternate_open_drain"),
                    );
                }

                let shared = declared.iter().all(|(_, p)| p.shared);
                let key = pin.claim_key();
                match claims.get(&key) {
                    Some((first_owner, first_role)) if !shared => issues.push(
                        Issue::error(
                            self.id(),
                            owner,
                            format!(
                                "pin {} is claimed by both {} {} and {} {}",
                                key, first_owner.name, first_role, owner.name, role
                            ),
                        )
                        .at(role)
                        .related_to(first_owner),
                    ),
                    Some(_) => {}
                    None => {
                        claims.insert(key, (owner.clone(), role));
                    }
                }
            }
        }
        issues
    }
}
