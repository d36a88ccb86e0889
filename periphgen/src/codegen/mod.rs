//! C source generation for the STM32 Cube HAL.
//!
//! The emitter is a pure function of its inputs: the same normalized
//! configuration always produces the same bytes.

pub mod hal;

use crate::analyzer::ValidationReport;
use crate::normalize::{
    NormalizedConfig, NormalizedI2c, NormalizedPin, NormalizedTimer, NormalizedUart, Routine,
};
use std::fmt::{self, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation blocked by {} validation error(s)", .0.stats().errors)]
    Blocked(Box<ValidationReport>),
    #[error("{path}: {reason}")]
    Invariant { path: String, reason: String },
    #[error("failed to format output: {0}")]
    Format(#[from] fmt::Error),
}

const INDENT: &str = "    ";

pub struct CodeEmitter;

impl CodeEmitter {
    /// Render the init source, refusing when `report` holds any error.
    pub fn emit(report: &ValidationReport, config: &NormalizedConfig) -> Result<String, GenerationError> {
        if report.has_errors() {
            return Err(GenerationError::Blocked(Box::new(report.clone())));
        }

        let mut out = String::new();
        Self::write_preamble(&mut out, config)?;
        if !config.pins.is_empty() {
            Self::write_gpio(&mut out, config)?;
        }
        for routine in config.routines() {
            match routine {
                Routine::Uart(uart) => Self::write_uart(&mut out, &routine, uart)?,
                Routine::I2c(i2c) => Self::write_i2c(&mut out, &routine, i2c)?,
                Routine::Timer(timer) => Self::write_timer(&mut out, &routine, timer)?,
            }
        }
        Self::write_aggregator(&mut out, config)?;

        tracing::info!(
            "Generated {} bytes for {} ({} pins, {} routines)",
            out.len(),
            config.board.name,
            config.pins.len(),
            config.routines().count()
        );
        Ok(out)
    }

    fn write_preamble(out: &mut String, config: &NormalizedConfig) -> fmt::Result {
        writeln!(out, "/* auto-generated for {} */", comment_text(&config.board.name))?;
        writeln!(out, "#include \"{}\"", hal::header(&config.board.hal_family))?;
        writeln!(out)?;
        writeln!(out, "void Error_Handler(void);")?;
        writeln!(out)
    }

    fn write_gpio(out: &mut String, config: &NormalizedConfig) -> fmt::Result {
        writeln!(out, "static void init_gpio(void) {{")?;
        writeln!(out, "{}GPIO_InitTypeDef GpioStruct = {{0}};", INDENT)?;

        let mut enabled_ports: Vec<char> = Vec::new();
        for pin in &config.pins {
            writeln!(out)?;
            if !enabled_ports.contains(&pin.id.port) {
                writeln!(out, "{}__HAL_RCC_GPIO{}_CLK_ENABLE();", INDENT, pin.id.port)?;
                enabled_ports.push(pin.id.port);
            }
            Self::write_pin(out, pin)?;
        }

        writeln!(out, "}}")?;
        writeln!(out)
    }

    fn write_pin(out: &mut String, pin: &NormalizedPin) -> fmt::Result {
        if let Some(comment) = &pin.comment {
            writeln!(out, "{}/* {}: {} */", INDENT, pin.id, comment_text(comment))?;
        }
        writeln!(out, "{}GpioStruct.Pin = GPIO_PIN_{};", INDENT, pin.id.number)?;
        writeln!(out, "{}GpioStruct.Mode = {};", INDENT, hal::gpio_mode(pin.direction))?;
        if let Some(af) = &pin.alt_function {
            writeln!(out, "{}GpioStruct.Alternate = {};", INDENT, af)?;
        }
        writeln!(out, "{}GpioStruct.Pull = {};", INDENT, hal::gpio_pull(pin.pull))?;
        writeln!(out, "{}GpioStruct.Speed = {};", INDENT, hal::gpio_speed(pin.speed))?;
        writeln!(out, "{}HAL_GPIO_Init(GPIO{}, &GpioStruct);", INDENT, pin.id.port)
    }

    fn write_uart(out: &mut String, routine: &Routine<'_>, uart: &NormalizedUart) -> fmt::Result {
        let h = Self::open_routine(out, routine)?;
        writeln!(out, "{}{}.Init.BaudRate = {};", INDENT, h, uart.baudrate)?;
        writeln!(out, "{}{}.Init.WordLength = {};", INDENT, h, hal::uart_word_length(uart.word_length))?;
        writeln!(out, "{}{}.Init.StopBits = {};", INDENT, h, hal::uart_stop_bits(uart.stop_bits))?;
        writeln!(out, "{}{}.Init.Parity = {};", INDENT, h, hal::uart_parity(uart.parity))?;
        writeln!(out, "{}{}.Init.Mode = {};", INDENT, h, hal::uart_mode(uart.mode))?;
        writeln!(out, "{}{}.Init.HwFlowCtl = {};", INDENT, h, hal::uart_flow_control(uart.flow_control))?;
        writeln!(out, "{}{}.Init.OverSampling = UART_OVERSAMPLING_16;", INDENT, h)?;
        Self::check_init(out, &format!("HAL_UART_Init(&{})", h))?;
        Self::close_routine(out)
    }

    fn write_i2c(out: &mut String, routine: &Routine<'_>, i2c: &NormalizedI2c) -> fmt::Result {
        let h = Self::open_routine(out, routine)?;
        writeln!(out, "{}{}.Init.ClockSpeed = {};", INDENT, h, i2c.speed)?;
        writeln!(out, "{}{}.Init.DutyCycle = {};", INDENT, h, hal::i2c_duty_cycle(i2c.duty_cycle))?;
        writeln!(
            out,
            "{}{}.Init.OwnAddress1 = {};",
            INDENT,
            h,
            hal::i2c_own_address(i2c.addressing_mode, i2c.own_address)
        )?;
        writeln!(
            out,
            "{}{}.Init.AddressingMode = {};",
            INDENT,
            h,
            hal::i2c_addressing_mode(i2c.addressing_mode)
        )?;
        writeln!(out, "{}{}.Init.DualAddressMode = I2C_DUALADDRESS_DISABLE;", INDENT, h)?;
        writeln!(out, "{}{}.Init.OwnAddress2 = 0;", INDENT, h)?;
        writeln!(out, "{}{}.Init.GeneralCallMode = I2C_GENERALCALL_DISABLE;", INDENT, h)?;
        writeln!(out, "{}{}.Init.NoStretchMode = I2C_NOSTRETCH_DISABLE;", INDENT, h)?;
        Self::check_init(out, &format!("HAL_I2C_Init(&{})", h))?;
        Self::close_routine(out)
    }

    fn write_timer(out: &mut String, routine: &Routine<'_>, timer: &NormalizedTimer) -> fmt::Result {
        let h = Self::open_routine(out, routine)?;
        writeln!(out, "{}{}.Init.Prescaler = {};", INDENT, h, timer.prescaler - 1)?;
        writeln!(
            out,
            "{}{}.Init.CounterMode = {};",
            INDENT,
            h,
            hal::timer_counter_mode(timer.counter_mode)
        )?;
        writeln!(out, "{}{}.Init.Period = {};", INDENT, h, timer.period - 1)?;
        writeln!(
            out,
            "{}{}.Init.ClockDivision = {};",
            INDENT,
            h,
            hal::timer_clock_division(timer.clock_division)
        )?;
        writeln!(out, "{}{}.Init.AutoReloadPreload = TIM_AUTORELOAD_PRELOAD_DISABLE;", INDENT, h)?;

        match (timer.pwm, timer.pulse()) {
            (Some(pwm), Some(pulse)) => {
                Self::check_init(out, &format!("HAL_TIM_PWM_Init(&{})", h))?;
                writeln!(out)?;
                writeln!(out, "{}TIM_OC_InitTypeDef OcStruct = {{0}};", INDENT)?;
                writeln!(out, "{}OcStruct.OCMode = TIM_OCMODE_PWM1;", INDENT)?;
                writeln!(out, "{}OcStruct.Pulse = {};", INDENT, pulse)?;
                writeln!(out, "{}OcStruct.OCPolarity = TIM_OCPOLARITY_HIGH;", INDENT)?;
                writeln!(out, "{}OcStruct.OCFastMode = TIM_OCFAST_DISABLE;", INDENT)?;
                Self::check_init(
                    out,
                    &format!(
                        "HAL_TIM_PWM_ConfigChannel(&{}, &OcStruct, {})",
                        h,
                        hal::timer_channel(pwm.channel)
                    ),
                )?;
            }
            _ => Self::check_init(out, &format!("HAL_TIM_Base_Init(&{})", h))?,
        }
        Self::close_routine(out)
    }

    /// Handle declaration and routine head; returns the handle name.
    fn open_routine(out: &mut String, routine: &Routine<'_>) -> Result<String, fmt::Error> {
        let handle = hal::handle_name(routine);
        writeln!(out, "{} {};", hal::handle_type(routine), handle)?;
        writeln!(out)?;
        writeln!(out, "void init_{}(void) {{", routine.instance())?;
        writeln!(out, "{}{}.Instance = {};", INDENT, handle, routine.instance())?;
        Ok(handle)
    }

    fn check_init(out: &mut String, call: &str) -> fmt::Result {
        writeln!(out, "{}if ({} != HAL_OK) {{", INDENT, call)?;
        writeln!(out, "{}{}Error_Handler();", INDENT, INDENT)?;
        writeln!(out, "{}}}", INDENT)
    }

    fn close_routine(out: &mut String) -> fmt::Result {
        writeln!(out, "}}")?;
        writeln!(out)
    }

    fn write_aggregator(out: &mut String, config: &NormalizedConfig) -> fmt::Result {
        writeln!(out, "void initialize_peripherals(void) {{")?;
        if !config.pins.is_empty() {
            writeln!(out, "{}init_gpio();", INDENT)?;
        }
        for routine in config.routines() {
            writeln!(out, "{}init_{}();", INDENT, routine.instance())?;
        }
        writeln!(out, "}}")
    }
}

/// Text safe to place inside a C block comment.
fn comment_text(text: &str) -> String {
    text.replace("*/", "* /").replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{Issue, RulesEngine};
    use crate::core::ValidationOptions;
    use crate::model::{PeripheralKind, PeripheralRef};
    use crate::normalize::normalize;
    use crate::parser::parse_str;

    const DISCOVERY: &str = "\
board:
  name: STM32F4-Discovery
  mcu: STM32F407VG
gpio:
  pins:
    - pin: PD12
      direction: output
      comment: green LED
    - pin: PA9
      alt_function: GPIO_AF7_USART1
      speed: high
      comment: console TX
    - pin: PA10
      alt_function: GPIO_AF7_USART1
      pull: pull_up
      speed: high
      comment: console RX
communication:
  uart:
    - instance: USART1
      baudrate: 115200
      tx_pin: PA9
      rx_pin: PA10
";

    fn generate(yaml: &str) -> Result<String, GenerationError> {
        let config = parse_str(yaml).unwrap();
        let report = RulesEngine::with_default_rules().validate(&config, &ValidationOptions::default());
        CodeEmitter::emit(&report, &normalize(&config)?)
    }

    #[test]
    fn test_preamble_and_gpio_block() {
        let out = generate(DISCOVERY).unwrap();
        assert!(out.starts_with("/* auto-generated for STM32F4-Discovery */\n#include \"stm32f4xx_hal.h\"\n"));
        assert!(out.contains("void Error_Handler(void);"));
        assert!(out.contains("    /* PA9: console TX */\n    GpioStruct.Pin = GPIO_PIN_9;\n    GpioStruct.Mode = GPIO_MODE_AF_PP;\n    GpioStruct.Alternate = GPIO_AF7_USART1;\n"));
        assert_eq!(out.matches("__HAL_RCC_GPIOA_CLK_ENABLE();").count(), 1);
        assert_eq!(out.matches("__HAL_RCC_GPIOD_CLK_ENABLE();").count(), 1);
        // PA pins sort ahead of PD12.
        assert!(out.find("GPIO_PIN_9;").unwrap() < out.find("GPIO_PIN_12;").unwrap());
    }

    #[test]
    fn test_uart_routine() {
        let out = generate(DISCOVERY).unwrap();
        assert!(out.contains("UART_HandleTypeDef huart1;\n\nvoid init_USART1(void) {\n    huart1.Instance = USART1;\n    huart1.Init.BaudRate = 115200;\n"));
        assert!(out.contains("    if (HAL_UART_Init(&huart1) != HAL_OK) {\n        Error_Handler();\n    }\n"));
        assert!(out.ends_with("void initialize_peripherals(void) {\n    init_gpio();\n    init_USART1();\n}\n"));
    }

    #[test]
    fn test_timer_registers_take_divisor_minus_one() {
        let out = generate("timers:\n  - instance: TIM2\n    prescaler: 8400\n    period: 1000\n").unwrap();
        assert!(out.contains("htim2.Init.Prescaler = 8399;"));
        assert!(out.contains("htim2.Init.Period = 999;"));
        assert!(out.contains("HAL_TIM_Base_Init(&htim2)"));
        assert!(!out.contains("init_gpio"));
    }

    #[test]
    fn test_pwm_channel() {
        let out = generate(
            "timers:\n  - instance: TIM4\n    prescaler: 84\n    period: 1000\n    mode: pwm\n    channel: 1\n    duty_cycle: 50\n",
        )
        .unwrap();
        assert!(out.contains("HAL_TIM_PWM_Init(&htim4)"));
        assert!(out.contains("OcStruct.Pulse = 500;"));
        assert!(out.contains("HAL_TIM_PWM_ConfigChannel(&htim4, &OcStruct, TIM_CHANNEL_1)"));
        assert!(!out.contains("HAL_TIM_Base_Init"));
    }

    #[test]
    fn test_i2c_seven_bit_address_is_shifted() {
        let out = generate(
            "gpio:\n  pins:\n    - pin: PB6\n      direction: alternate_open_drain\n      alt_function: GPIO_AF4_I2C1\n      comment: scl\n    - pin: PB7\n      direction: alternate_open_drain\n      alt_function: GPIO_AF4_I2C1\n      comment: sda\ncommunication:\n  i2c:\n    - instance: I2C1\n      own_address: 72\n      scl_pin: PB6\n      sda_pin: PB7\n",
        )
        .unwrap();
        assert!(out.contains("hi2c1.Init.OwnAddress1 = 144;"));
    }

    #[test]
    fn test_blocked_by_errors() {
        let config = parse_str("").unwrap();
        let at = PeripheralRef::new(PeripheralKind::Uart, 0, "USART1");
        let report = ValidationReport::new(vec![Issue::error("uart_settings", &at, "bad baud")]);
        let err = CodeEmitter::emit(&report, &normalize(&config).unwrap()).unwrap_err();
        assert!(matches!(err, GenerationError::Blocked(_)));
        assert_eq!(err.to_string(), "generation blocked by 1 validation error(s)");
    }

    #[test]
    fn test_output_is_deterministic() {
        assert_eq!(generate(DISCOVERY).unwrap(), generate(DISCOVERY).unwrap());
    }

    #[test]
    fn test_comment_cannot_close_block_comment() {
        assert_eq!(comment_text("a */ b\nc"), "a * / b c");
    }
}
