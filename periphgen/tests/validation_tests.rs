//! Tests for specific validation rules

use periphgen::prelude::*;
use periphgen::{parse_file, parse_str, RulesEngine};
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn issues_for(name: &str) -> Vec<Issue> {
    let config = parse_file(&fixture_path(name)).expect("Should parse description");
    RulesEngine::with_default_rules().analyze(&config)
}

#[test]
fn test_duplicate_pin_names_both_entries() {
    let issues = issues_for("duplicate_pin.yaml");

    let conflicts: Vec<_> = issues
        .iter()
        .filter(|i| i.rule_id == "pin_conflict")
        .collect();

    assert_eq!(conflicts.len(), 1, "Should report the PA9 clash once");
    let conflict = conflicts[0];
    assert_eq!(conflict.severity, Severity::Error);
    assert!(conflict.message.contains("gpio.pins[0]"));
    assert!(conflict.message.contains("gpio.pins[1]"));
    assert_eq!(conflict.field.as_deref(), Some("gpio.pins[1].pin"));
    assert_eq!(conflict.related.as_ref().map(|r| r.index), Some(0));
}

#[test]
fn test_shared_pin_is_accepted() {
    let issues = issues_for("shared_pin.yaml");
    assert!(
        issues.iter().all(|i| i.severity != Severity::Error),
        "Shared PB8 should not be an error: {:?}",
        issues.iter().map(|i| i.to_string()).collect::<Vec<_>>()
    );
}

#[test]
fn test_shared_pin_with_different_settings() {
    let config = parse_str(
        "gpio:\n  pins:\n    - pin: PB8\n      direction: output\n      shared: true\n      comment: a\n    - pin: PB8\n      direction: input\n      shared: true\n      comment: b\n",
    )
    .unwrap();
    let issues = RulesEngine::with_default_rules().analyze(&config);
    assert!(issues
        .iter()
        .any(|i| i.rule_id == "pin_conflict" && i.message.contains("configured differently")));
}

#[test]
fn test_out_of_range_values() {
    let issues = issues_for("invalid_values.yaml");

    let fields: Vec<_> = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .filter_map(|i| i.field.as_deref())
        .collect();

    assert!(fields.contains(&"communication.uart[0].baudrate"));
    assert!(fields.contains(&"communication.i2c[0].speed"));
    assert!(fields.contains(&"timers[0].prescaler"));
}

#[test]
fn test_negative_baud_is_an_error() {
    let config = parse_str(
        "communication:\n  uart:\n    - instance: USART1\n      baudrate: -9600\n      tx_pin: PA9\n",
    )
    .unwrap();
    let issues = RulesEngine::with_default_rules().analyze(&config);
    assert!(issues.iter().any(|i| i.rule_id == "uart_settings"
        && i.severity == Severity::Error
        && i.message.contains("-9600")));
}

#[test]
fn test_unreferenced_signal_pin() {
    let config = parse_str(
        "communication:\n  uart:\n    - instance: USART1\n      baudrate: 115200\n      tx_pin: PA9\n",
    )
    .unwrap();
    let issues = RulesEngine::with_default_rules().analyze(&config);
    let missing = issues
        .iter()
        .find(|i| i.rule_id == "pin_reference")
        .expect("Should flag the undeclared TX pin");
    assert!(missing.message.contains("PA9"));
    assert!(missing.suggestion.is_some());
}

#[test]
fn test_severity_levels() {
    let issues = issues_for("warnings_only.yaml");

    assert!(!issues.is_empty());
    assert!(issues.iter().all(|i| i.severity == Severity::Warning));
    assert!(issues.iter().any(|i| i.rule_id == "pin_comment"));
    assert!(issues.iter().any(|i| i.rule_id == "uart_settings"));
}

#[test]
fn test_strict_promotes_warnings() {
    let config = parse_file(&fixture_path("warnings_only.yaml")).unwrap();
    let strict = ValidationOptions {
        strict: true,
        ..Default::default()
    };

    let report = PeriphGen::validate(&config, &strict);
    assert!(!report.passed());
    assert_eq!(report.stats().warnings, 0);
    assert_eq!(report.stats().errors, report.total_issues());
}

#[test]
fn test_issue_structure() {
    for issue in issues_for("invalid_values.yaml") {
        assert!(!issue.rule_id.is_empty());
        assert!(!issue.message.is_empty());
        assert!(issue.location().starts_with(&issue.peripheral.path()));
    }
}

#[test]
fn test_rule_ids_are_unique() {
    let engine = RulesEngine::with_default_rules();
    let mut ids: Vec<_> = engine.rules().iter().map(|r| r.id().to_string()).collect();
    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), total);
}
