//! UART and I2C instances.

use super::keyword::{Choice, Keyword};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

impl Keyword for Parity {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("none", Parity::None),
        ("even", Parity::Even),
        ("odd", Parity::Odd),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
    None,
    Rts,
    Cts,
    RtsCts,
}

impl Keyword for FlowControl {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("none", FlowControl::None),
        ("rts", FlowControl::Rts),
        ("cts", FlowControl::Cts),
        ("rts_cts", FlowControl::RtsCts),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordLength {
    Eight,
    Nine,
}

impl WordLength {
    pub fn from_bits(bits: i64) -> Option<Self> {
        match bits {
            8 => Some(WordLength::Eight),
            9 => Some(WordLength::Nine),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

impl StopBits {
    pub fn from_count(count: i64) -> Option<Self> {
        match count {
            1 => Some(StopBits::One),
            2 => Some(StopBits::Two),
            _ => None,
        }
    }
}

/// One entry of `communication.uart`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UartConfig {
    pub instance: String,
    pub enabled: bool,
    pub baudrate: Option<i64>,
    pub data_bits: i64,
    pub parity: Choice<Parity>,
    pub stop_bits: i64,
    pub flow_control: Choice<FlowControl>,
    pub tx_pin: Option<String>,
    pub rx_pin: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    SevenBit,
    TenBit,
}

impl AddressingMode {
    pub fn max_address(self) -> i64 {
        match self {
            AddressingMode::SevenBit => 0x7F,
            AddressingMode::TenBit => 0x3FF,
        }
    }
}

impl Keyword for AddressingMode {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("7bit", AddressingMode::SevenBit),
        ("10bit", AddressingMode::TenBit),
    ];
}

/// Low/high ratio of SCL in fast mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DutyCycle {
    Two,
    SixteenNine,
}

impl Keyword for DutyCycle {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("2", DutyCycle::Two),
        ("16_9", DutyCycle::SixteenNine),
        ("16/9", DutyCycle::SixteenNine),
    ];
}

/// One entry of `communication.i2c`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct I2cConfig {
    pub instance: String,
    pub enabled: bool,
    pub speed: i64,
    pub addressing_mode: Choice<AddressingMode>,
    pub own_address: i64,
    pub duty_cycle: Choice<DutyCycle>,
    pub scl_pin: Option<String>,
    pub sda_pin: Option<String>,
}
