//! Parser tests over the YAML fixtures

use periphgen::model::Direction;
use periphgen::{parse_file, ParseError};
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_parse_discovery_board() {
    let config = parse_file(&fixture_path("discovery.yaml")).expect("Should parse");

    assert_eq!(config.board.display_name(), "STM32F4-Discovery");
    assert_eq!(config.board.hal_family().as_deref(), Some("stm32f4xx"));
    assert_eq!(config.board.clock_freq, Some(84_000_000));
    assert_eq!(config.pins.len(), 8);
    assert_eq!(config.uarts.len(), 2);
    assert_eq!(config.i2cs.len(), 1);
    assert_eq!(config.timers.len(), 3);
}

#[test]
fn test_parse_keeps_document_order_and_flags() {
    let config = parse_file(&fixture_path("discovery.yaml")).unwrap();

    let names: Vec<_> = config.uarts.iter().map(|u| u.instance.as_str()).collect();
    assert_eq!(names, ["USART1", "USART2"]);
    assert!(config.uarts[0].enabled);
    assert!(!config.uarts[1].enabled);
    assert!(!config.timers[2].enabled);
    assert_eq!(config.timers[1].channel, Some(3));
    assert_eq!(config.timers[1].duty_cycle, Some(25));
}

#[test]
fn test_default_direction_follows_alt_function() {
    let config = parse_file(&fixture_path("scenario.yaml")).unwrap();

    let pa9 = config.pins.iter().find(|p| p.pin == "PA9").unwrap();
    assert_eq!(pa9.direction, None);
    assert_eq!(pa9.effective_direction(), Some(Direction::Alternate));

    let pd12 = config.pins.iter().find(|p| p.pin == "PD12").unwrap();
    assert_eq!(pd12.effective_direction(), Some(Direction::Output));
}

#[test]
fn test_parse_unknown_key() {
    let err = parse_file(&fixture_path("unknown_key.yaml")).unwrap_err();
    assert!(matches!(err, ParseError::UnknownKey { .. }));
    assert_eq!(err.path(), Some("gpio.pins[0].colour"));
}

#[test]
fn test_parse_wrong_type() {
    let err = parse_file(&fixture_path("bad_type.yaml")).unwrap_err();
    assert_eq!(err.path(), Some("communication.uart[0].baudrate"));
    assert!(err.to_string().contains("expected integer"));
}

#[test]
fn test_parse_missing_file() {
    let err = parse_file(&fixture_path("nonexistent.yaml")).unwrap_err();
    assert!(matches!(err, ParseError::Io { .. }));
    assert!(err.to_string().contains("nonexistent.yaml"));
}
