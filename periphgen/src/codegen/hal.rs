//! STM32 Cube HAL names for resolved settings.

use crate::model::{
    AddressingMode, ClockDivision, CounterMode, Direction, DutyCycle, FlowControl, Parity, Pull,
    Speed, StopBits, WordLength,
};
use crate::normalize::{Routine, TransferMode};

pub fn header(hal_family: &str) -> String {
    format!("{}_hal.h", hal_family)
}

/// Global handle variable for a routine: `USART1` → `huart1`, `I2C2` →
/// `hi2c2`, `TIM3` → `htim3`.
pub fn handle_name(routine: &Routine<'_>) -> String {
    let instance = routine.instance();
    let prefix = instance.trim_end_matches(|c: char| c.is_ascii_digit());
    let unit = &instance[prefix.len()..];
    let stem = match routine {
        Routine::Uart(_) => "huart",
        Routine::I2c(_) => "hi2c",
        Routine::Timer(_) => "htim",
    };
    format!("{}{}", stem, unit)
}

pub fn handle_type(routine: &Routine<'_>) -> &'static str {
    match routine {
        Routine::Uart(_) => "UART_HandleTypeDef",
        Routine::I2c(_) => "I2C_HandleTypeDef",
        Routine::Timer(_) => "TIM_HandleTypeDef",
    }
}

pub fn gpio_mode(direction: Direction) -> &'static str {
    match direction {
        Direction::Input => "GPIO_MODE_INPUT",
        Direction::Output => "GPIO_MODE_OUTPUT_PP",
        Direction::OutputOpenDrain => "GPIO_MODE_OUTPUT_OD",
        Direction::Alternate => "GPIO_MODE_AF_PP",
        Direction::AlternateOpenDrain => "GPIO_MODE_AF_OD",
        Direction::Analog => "GPIO_MODE_ANALOG",
    }
}

pub fn gpio_pull(pull: Pull) -> &'static str {
    match pull {
        Pull::None => "GPIO_NOPULL",
        Pull::Up => "GPIO_PULLUP",
        Pull::Down => "GPIO_PULLDOWN",
    }
}

pub fn gpio_speed(speed: Speed) -> &'static str {
    match speed {
        Speed::Low => "GPIO_SPEED_FREQ_LOW",
        Speed::Medium => "GPIO_SPEED_FREQ_MEDIUM",
        Speed::High => "GPIO_SPEED_FREQ_HIGH",
        Speed::VeryHigh => "GPIO_SPEED_FREQ_VERY_HIGH",
    }
}

pub fn uart_word_length(word_length: WordLength) -> &'static str {
    match word_length {
        WordLength::Eight => "UART_WORDLENGTH_8B",
        WordLength::Nine => "UART_WORDLENGTH_9B",
    }
}

pub fn uart_stop_bits(stop_bits: StopBits) -> &'static str {
    match stop_bits {
        StopBits::One => "UART_STOPBITS_1",
        StopBits::Two => "UART_STOPBITS_2",
    }
}

pub fn uart_parity(parity: Parity) -> &'static str {
    match parity {
        Parity::None => "UART_PARITY_NONE",
        Parity::Even => "UART_PARITY_EVEN",
        Parity::Odd => "UART_PARITY_ODD",
    }
}

pub fn uart_flow_control(flow: FlowControl) -> &'static str {
    match flow {
        FlowControl::None => "UART_HWCONTROL_NONE",
        FlowControl::Rts => "UART_HWCONTROL_RTS",
        FlowControl::Cts => "UART_HWCONTROL_CTS",
        FlowControl::RtsCts => "UART_HWCONTROL_RTS_CTS",
    }
}

pub fn uart_mode(mode: TransferMode) -> &'static str {
    match mode {
        TransferMode::TxRx => "UART_MODE_TX_RX",
        TransferMode::Tx => "UART_MODE_TX",
        TransferMode::Rx => "UART_MODE_RX",
    }
}

pub fn i2c_addressing_mode(mode: AddressingMode) -> &'static str {
    match mode {
        AddressingMode::SevenBit => "I2C_ADDRESSINGMODE_7BIT",
        AddressingMode::TenBit => "I2C_ADDRESSINGMODE_10BIT",
    }
}

pub fn i2c_duty_cycle(duty: DutyCycle) -> &'static str {
    match duty {
        DutyCycle::Two => "I2C_DUTYCYCLE_2",
        DutyCycle::SixteenNine => "I2C_DUTYCYCLE_16_9",
    }
}

/// `OwnAddress1` as the HAL expects it: 7-bit addresses sit in bits 7:1.
pub fn i2c_own_address(mode: AddressingMode, address: u16) -> u32 {
    match mode {
        AddressingMode::SevenBit => u32::from(address) << 1,
        AddressingMode::TenBit => u32::from(address),
    }
}

pub fn timer_counter_mode(mode: CounterMode) -> &'static str {
    match mode {
        CounterMode::Up => "TIM_COUNTERMODE_UP",
        CounterMode::Down => "TIM_COUNTERMODE_DOWN",
        CounterMode::CenterAligned1 => "TIM_COUNTERMODE_CENTERALIGNED1",
        CounterMode::CenterAligned2 => "TIM_COUNTERMODE_CENTERALIGNED2",
        CounterMode::CenterAligned3 => "TIM_COUNTERMODE_CENTERALIGNED3",
    }
}

pub fn timer_clock_division(division: ClockDivision) -> &'static str {
    match division {
        ClockDivision::Div1 => "TIM_CLOCKDIVISION_DIV1",
        ClockDivision::Div2 => "TIM_CLOCKDIVISION_DIV2",
        ClockDivision::Div4 => "TIM_CLOCKDIVISION_DIV4",
    }
}

pub fn timer_channel(channel: u8) -> String {
    format!("TIM_CHANNEL_{}", channel)
}
