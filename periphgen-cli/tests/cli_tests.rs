//! CLI integration tests

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

/// Build command for the periphgen binary (finds it in target/debug when run via cargo test).
fn periphgen_cli() -> Command {
    cargo_bin_cmd!("periphgen")
}

/// Path to periphgen library test fixtures (relative to workspace).
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("periphgen")
        .join("tests")
        .join("fixtures")
}

#[test]
fn test_cli_help() {
    let mut cmd = periphgen_cli();

    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("STM32"))
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn test_cli_version() {
    let mut cmd = periphgen_cli();

    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_generate_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("init.c");

    let mut cmd = periphgen_cli();
    cmd.arg("generate")
        .arg(fixtures_dir().join("scenario.yaml"))
        .arg("-o")
        .arg(&output);

    cmd.assert().code(0);
    let source = std::fs::read_to_string(&output).unwrap();
    assert!(source.contains("void init_USART1(void) {"));
    assert!(source.contains("void initialize_peripherals(void) {"));
}

#[test]
fn test_cli_generate_default_output_name() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = periphgen_cli();
    cmd.current_dir(dir.path())
        .arg("generate")
        .arg(fixtures_dir().join("scenario.yaml"));

    cmd.assert().success();
    assert!(dir.path().join("peripheral_init.c").exists());
}

#[test]
fn test_cli_generate_to_stdout() {
    let mut cmd = periphgen_cli();
    cmd.arg("generate")
        .arg(fixtures_dir().join("discovery.yaml"))
        .arg("-o")
        .arg("-");

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("/* auto-generated for STM32F4-Discovery */"))
        .stdout(predicate::str::contains("init_TIM4();"));
}

#[test]
fn test_cli_generate_is_deterministic() {
    let run = || {
        periphgen_cli()
            .arg("generate")
            .arg(fixtures_dir().join("discovery.yaml"))
            .arg("-o")
            .arg("-")
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn test_cli_generate_blocked_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("init.c");

    let mut cmd = periphgen_cli();
    cmd.arg("generate")
        .arg(fixtures_dir().join("duplicate_pin.yaml"))
        .arg("-o")
        .arg(&output);

    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("gpio.pins[0]"))
        .stderr(predicate::str::contains("gpio.pins[1]"))
        .stderr(predicate::str::contains("generation blocked"));
    assert!(!output.exists());
}

#[test]
fn test_cli_generate_warnings_go_to_stderr() {
    let mut cmd = periphgen_cli();
    cmd.arg("generate")
        .arg(fixtures_dir().join("warnings_only.yaml"))
        .arg("-o")
        .arg("-");

    cmd.assert()
        .code(0)
        .stderr(predicate::str::contains("warning"))
        .stdout(predicate::str::contains("huart2.Init.BaudRate = 12345;"));
}

#[test]
fn test_cli_generate_strict_blocks_warnings() {
    let mut cmd = periphgen_cli();
    cmd.arg("generate")
        .arg(fixtures_dir().join("warnings_only.yaml"))
        .arg("-o")
        .arg("-")
        .arg("--strict");

    cmd.assert().code(1).stdout(predicate::str::is_empty());
}

#[test]
fn test_cli_validate_valid_file() {
    let mut cmd = periphgen_cli();
    cmd.arg("validate").arg(fixtures_dir().join("discovery.yaml"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No issues found"));
}

#[test]
fn test_cli_validate_duplicate_pin() {
    let mut cmd = periphgen_cli();
    cmd.arg("validate").arg(fixtures_dir().join("duplicate_pin.yaml"));

    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("ERRORS"))
        .stdout(predicate::str::contains("gpio.pins[0]"))
        .stdout(predicate::str::contains("gpio.pins[1]"));
}

#[test]
fn test_cli_validate_json_output() {
    let mut cmd = periphgen_cli();
    cmd.arg("validate")
        .arg(fixtures_dir().join("invalid_values.yaml"))
        .arg("--format")
        .arg("json");

    let output = cmd.output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let result = &json["results"][0];
    assert_eq!(result["passed"], false);
    assert!(result["stats"]["errors"].as_u64().unwrap() >= 3);
    assert!(result["issues"]
        .as_array()
        .unwrap()
        .iter()
        .any(|issue| issue["field"] == "communication.uart[0].baudrate" && issue["severity"] == "error"));
}

#[test]
fn test_cli_validate_github_format() {
    let mut cmd = periphgen_cli();
    cmd.arg("validate")
        .arg(fixtures_dir().join("warnings_only.yaml"))
        .arg("--format")
        .arg("github");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("::warning file="));
}

#[test]
fn test_cli_validate_rule_filter() {
    let mut cmd = periphgen_cli();
    cmd.arg("validate")
        .arg(fixtures_dir().join("warnings_only.yaml"))
        .arg("--rule")
        .arg("board")
        .arg("--strict");

    cmd.assert().success();
}

#[test]
fn test_cli_validate_unknown_key() {
    let mut cmd = periphgen_cli();
    cmd.arg("validate").arg(fixtures_dir().join("unknown_key.yaml"));

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("gpio.pins[0].colour"));
}

#[test]
fn test_cli_validate_wrong_type() {
    let mut cmd = periphgen_cli();
    cmd.arg("validate").arg(fixtures_dir().join("bad_type.yaml"));

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("communication.uart[0].baudrate"));
}

#[test]
fn test_cli_nonexistent_file() {
    let mut cmd = periphgen_cli();
    cmd.arg("generate").arg("does_not_exist.yaml").arg("-o").arg("-");

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_cli_validate_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(fixtures_dir().join("scenario.yaml"), dir.path().join("a.yaml")).unwrap();
    std::fs::copy(fixtures_dir().join("disabled.yaml"), dir.path().join("b.yaml")).unwrap();

    let mut cmd = periphgen_cli();
    cmd.arg("validate").arg(dir.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("a.yaml"))
        .stdout(predicate::str::contains("b.yaml"));
}

#[test]
fn test_cli_summary_counts_disabled() {
    let mut cmd = periphgen_cli();
    cmd.arg("summary").arg(fixtures_dir().join("disabled.yaml"));

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--- config summary ---"))
        .stdout(predicate::str::contains("uart (1, 0 enabled)"))
        .stdout(predicate::str::contains("USART3: off"));
}

#[test]
fn test_cli_summary_json() {
    let mut cmd = periphgen_cli();
    cmd.arg("summary")
        .arg(fixtures_dir().join("discovery.yaml"))
        .arg("--format")
        .arg("json");

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["board"]["name"], "STM32F4-Discovery");
    assert_eq!(json["entries"].as_array().unwrap().len(), 14);
}

#[test]
fn test_cli_rules_command() {
    let mut cmd = periphgen_cli();

    cmd.arg("rules");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("pin_conflict"))
        .stdout(predicate::str::contains("timer_settings"));
}

#[test]
fn test_cli_rules_verbose() {
    let mut cmd = periphgen_cli();

    cmd.arg("rules").arg("--verbose");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("shared: true"));
}

#[test]
fn test_cli_output_formats_are_different() {
    let path = fixtures_dir().join("warnings_only.yaml");

    let human_output = periphgen_cli()
        .arg("validate")
        .arg(&path)
        .arg("--format")
        .arg("human")
        .output()
        .unwrap();
    let gitlab_output = periphgen_cli()
        .arg("validate")
        .arg(&path)
        .arg("--format")
        .arg("gitlab")
        .output()
        .unwrap();

    assert_ne!(
        human_output.stdout, gitlab_output.stdout,
        "Different formats should produce different output"
    );
}
