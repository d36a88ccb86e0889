//! Documented defaults for optional document fields.
//!
//! The parser fills these in for missing keys; the normalizer applies the
//! ones that depend on other fields (pin direction).

use super::comm::{AddressingMode, DutyCycle, FlowControl, Parity};
use super::pin::{Direction, Pull, Speed};
use super::timer::{CounterMode, TimerMode};

pub const BOARD_NAME: &str = "unknown_board";
pub const HAL_FAMILY: &str = "stm32f4xx";
/// APB1 timer clock of an STM32F4 running at 168 MHz.
pub const TIMER_CLOCK_HZ: i64 = 84_000_000;

pub const ENABLED: bool = true;
pub const SHARED: bool = false;

pub const PIN_PULL: Pull = Pull::None;
pub const PIN_SPEED: Speed = Speed::Medium;

pub const UART_DATA_BITS: i64 = 8;
pub const UART_PARITY: Parity = Parity::None;
pub const UART_STOP_BITS: i64 = 1;
pub const UART_FLOW_CONTROL: FlowControl = FlowControl::None;

pub const I2C_SPEED_HZ: i64 = 100_000;
pub const I2C_ADDRESSING_MODE: AddressingMode = AddressingMode::SevenBit;
pub const I2C_OWN_ADDRESS: i64 = 0;
pub const I2C_DUTY_CYCLE: DutyCycle = DutyCycle::Two;

pub const TIMER_COUNTER_MODE: CounterMode = CounterMode::Up;
pub const TIMER_CLOCK_DIVISION: i64 = 1;
pub const TIMER_MODE: TimerMode = TimerMode::Basic;

/// Pins with an alternate-function selector default to the alternate role,
/// everything else to input.
pub fn direction_for(alt_function: Option<&str>) -> Direction {
    if alt_function.is_some() {
        Direction::Alternate
    } else {
        Direction::Input
    }
}
