use super::fields::Fields;
use super::ParseError;
use crate::model::{
    defaults, BoardConfig, Choice, I2cConfig, PeripheralConfig, PinConfig, TimerConfig,
    UartConfig,
};
use serde_yaml::Value;
use std::path::Path;

const ROOT_KEYS: &[&str] = &["board", "gpio", "communication", "timers"];
const BOARD_KEYS: &[&str] = &["name", "mcu", "clock_freq"];
const GPIO_KEYS: &[&str] = &["pins"];
const COMMUNICATION_KEYS: &[&str] = &["uart", "i2c"];
const PIN_KEYS: &[&str] = &[
    "pin",
    "direction",
    "pull",
    "speed",
    "alt_function",
    "comment",
    "shared",
];
const UART_KEYS: &[&str] = &[
    "instance",
    "enabled",
    "baudrate",
    "data_bits",
    "word_length",
    "parity",
    "stop_bits",
    "flow_control",
    "tx_pin",
    "rx_pin",
];
const I2C_KEYS: &[&str] = &[
    "instance",
    "enabled",
    "speed",
    "clock_speed",
    "addressing_mode",
    "own_address",
    "duty_cycle",
    "scl_pin",
    "sda_pin",
];
const TIMER_KEYS: &[&str] = &[
    "instance",
    "enabled",
    "prescaler",
    "period",
    "counter_mode",
    "clock_division",
    "mode",
    "channel",
    "duty_cycle",
];

/// Parse a peripheral description from YAML text.
pub fn parse_str(input: &str) -> Result<PeripheralConfig, ParseError> {
    let document: Value = serde_yaml::from_str(input)?;
    if document.is_null() {
        tracing::debug!("Empty document; nothing configured");
        return Ok(PeripheralConfig::default());
    }
    let root = Fields::root(&document)?;
    root.allow_only(ROOT_KEYS)?;

    let board = match root.section("board")? {
        Some(fields) => parse_board(&fields)?,
        None => BoardConfig::default(),
    };

    let mut pins = Vec::new();
    if let Some(gpio) = root.section("gpio")? {
        gpio.allow_only(GPIO_KEYS)?;
        for (path, value) in gpio.entries("pins")? {
            pins.push(parse_pin(&Fields::new(path, value)?)?);
        }
    }

    let mut uarts = Vec::new();
    let mut i2cs = Vec::new();
    if let Some(comm) = root.section("communication")? {
        comm.allow_only(COMMUNICATION_KEYS)?;
        for (path, value) in comm.entries("uart")? {
            uarts.push(parse_uart(&Fields::new(path, value)?)?);
        }
        for (path, value) in comm.entries("i2c")? {
            i2cs.push(parse_i2c(&Fields::new(path, value)?)?);
        }
    }

    let mut timers = Vec::new();
    for (path, value) in root.entries("timers")? {
        timers.push(parse_timer(&Fields::new(path, value)?)?);
    }

    tracing::debug!(
        "Parsed document: {} pins, {} uart, {} i2c, {} timers",
        pins.len(),
        uarts.len(),
        i2cs.len(),
        timers.len()
    );

    Ok(PeripheralConfig {
        board,
        pins,
        uarts,
        i2cs,
        timers,
    })
}

/// Read and parse a peripheral description file.
pub fn parse_file(path: &Path) -> Result<PeripheralConfig, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Loading configuration from {}", path.display());
    parse_str(&content)
}

fn parse_board(fields: &Fields) -> Result<BoardConfig, ParseError> {
    fields.allow_only(BOARD_KEYS)?;
    Ok(BoardConfig {
        name: fields.string("name")?,
        mcu: fields.string("mcu")?,
        clock_freq: fields.integer("clock_freq")?,
    })
}

fn parse_pin(fields: &Fields) -> Result<PinConfig, ParseError> {
    fields.allow_only(PIN_KEYS)?;
    Ok(PinConfig {
        pin: fields.required_string("pin")?,
        direction: fields.keyword("direction")?,
        pull: fields
            .keyword("pull")?
            .unwrap_or(Choice::Known(defaults::PIN_PULL)),
        speed: fields
            .keyword("speed")?
            .unwrap_or(Choice::Known(defaults::PIN_SPEED)),
        alt_function: fields.string("alt_function")?,
        comment: fields.string("comment")?,
        shared: fields.boolean("shared")?.unwrap_or(defaults::SHARED),
    })
}

fn parse_uart(fields: &Fields) -> Result<UartConfig, ParseError> {
    fields.allow_only(UART_KEYS)?;
    Ok(UartConfig {
        instance: fields.required_string("instance")?,
        enabled: fields.boolean("enabled")?.unwrap_or(defaults::ENABLED),
        baudrate: fields.integer("baudrate")?,
        data_bits: fields
            .integer_any(&["data_bits", "word_length"])?
            .unwrap_or(defaults::UART_DATA_BITS),
        parity: fields
            .keyword("parity")?
            .unwrap_or(Choice::Known(defaults::UART_PARITY)),
        stop_bits: fields
            .integer("stop_bits")?
            .unwrap_or(defaults::UART_STOP_BITS),
        flow_control: fields
            .keyword("flow_control")?
            .unwrap_or(Choice::Known(defaults::UART_FLOW_CONTROL)),
        tx_pin: fields.string("tx_pin")?,
        rx_pin: fields.string("rx_pin")?,
    })
}

fn parse_i2c(fields: &Fields) -> Result<I2cConfig, ParseError> {
    fields.allow_only(I2C_KEYS)?;
    Ok(I2cConfig {
        instance: fields.required_string("instance")?,
        enabled: fields.boolean("enabled")?.unwrap_or(defaults::ENABLED),
        speed: fields
            .integer_any(&["speed", "clock_speed"])?
            .unwrap_or(defaults::I2C_SPEED_HZ),
        addressing_mode: fields
            .keyword("addressing_mode")?
            .unwrap_or(Choice::Known(defaults::I2C_ADDRESSING_MODE)),
        own_address: fields
            .integer("own_address")?
            .unwrap_or(defaults::I2C_OWN_ADDRESS),
        duty_cycle: fields
            .keyword("duty_cycle")?
            .unwrap_or(Choice::Known(defaults::I2C_DUTY_CYCLE)),
        scl_pin: fields.string("scl_pin")?,
        sda_pin: fields.string("sda_pin")?,
    })
}

fn parse_timer(fields: &Fields) -> Result<TimerConfig, ParseError> {
    fields.allow_only(TIMER_KEYS)?;
    Ok(TimerConfig {
        instance: fields.required_string("instance")?,
        enabled: fields.boolean("enabled")?.unwrap_or(defaults::ENABLED),
        prescaler: fields.integer("prescaler")?,
        period: fields.integer("period")?,
        counter_mode: fields
            .keyword("counter_mode")?
            .unwrap_or(Choice::Known(defaults::TIMER_COUNTER_MODE)),
        clock_division: fields
            .integer("clock_division")?
            .unwrap_or(defaults::TIMER_CLOCK_DIVISION),
        mode: fields
            .keyword("mode")?
            .unwrap_or(Choice::Known(defaults::TIMER_MODE)),
        channel: fields.integer("channel")?,
        duty_cycle: fields.integer("duty_cycle")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Direction, Parity, Pull, Speed};

    #[test]
    fn test_defaults_are_materialized() {
        let config = parse_str(
            "gpio:\n  pins:\n    - pin: PA0\ncommunication:\n  uart:\n    - instance: USART2\n      baudrate: 9600\n",
        )
        .unwrap();
        let pin = &config.pins[0];
        assert_eq!(pin.direction, None);
        assert_eq!(pin.pull, Choice::Known(Pull::None));
        assert_eq!(pin.speed, Choice::Known(Speed::Medium));
        assert!(!pin.shared);
        assert_eq!(pin.effective_direction(), Some(Direction::Input));

        let uart = &config.uarts[0];
        assert!(uart.enabled);
        assert_eq!(uart.data_bits, 8);
        assert_eq!(uart.stop_bits, 1);
        assert_eq!(uart.parity, Choice::Known(Parity::None));
    }

    #[test]
    fn test_empty_sections_are_allowed() {
        let config = parse_str("gpio:\n  pins: []\ntimers: []\n").unwrap();
        assert!(config.pins.is_empty());
        assert!(config.timers.is_empty());
        assert_eq!(config.board.display_name(), "unknown_board");
    }

    #[test]
    fn test_empty_document() {
        let config = parse_str("# nothing yet\n").unwrap();
        assert_eq!(config, PeripheralConfig::default());
    }

    #[test]
    fn test_unknown_top_level_section() {
        let err = parse_str("gpio: {pins: []}\ndma: {}\n").unwrap_err();
        assert!(matches!(err, ParseError::UnknownKey { ref path } if path == "dma"));
    }

    #[test]
    fn test_missing_instance_is_structural() {
        let err = parse_str("timers:\n  - prescaler: 10\n    period: 10\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingField { ref path } if path == "timers[0].instance"));
    }

    #[test]
    fn test_sequence_expected() {
        let err = parse_str("gpio:\n  pins: PA9\n").unwrap_err();
        assert_eq!(err.path(), Some("gpio.pins"));
    }

    #[test]
    fn test_root_must_be_mapping() {
        let err = parse_str("- PA9\n- PA10\n").unwrap_err();
        assert_eq!(err.path(), Some("document"));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = parse_str("gpio: [unclosed\n").unwrap_err();
        assert!(matches!(err, ParseError::Syntax(_)));
    }

    #[test]
    fn test_i2c_clock_speed_alias() {
        let config = parse_str(
            "communication:\n  i2c:\n    - instance: I2C1\n      clock_speed: 400000\n",
        )
        .unwrap();
        assert_eq!(config.i2cs[0].speed, 400_000);
    }

    #[test]
    fn test_negative_baud_is_kept_for_validation() {
        let config = parse_str(
            "communication:\n  uart:\n    - instance: USART1\n      baudrate: -9600\n",
        )
        .unwrap();
        assert_eq!(config.uarts[0].baudrate, Some(-9600));
    }
}
