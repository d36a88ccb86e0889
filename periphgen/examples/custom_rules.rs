//! Example: adding a project-specific rule to the RulesEngine.
//! Run with: cargo run --example custom_rules [path/to/board.yaml]

use periphgen::model::{PeripheralConfig, PeripheralKind, PeripheralRef};
use periphgen::{parse_file, Issue, Rule, RulesEngine, Severity};
use std::path::Path;
use std::sync::Arc;

/// House rule: every enabled UART runs at 115200.
struct HouseBaudRule;

impl Rule for HouseBaudRule {
    fn id(&self) -> &str {
        "house_baud"
    }

    fn name(&self) -> &str {
        "House baud rate"
    }

    fn description(&self) -> &str {
        "Enabled UARTs run at 115200"
    }

    fn check(&self, config: &PeripheralConfig) -> Vec<Issue> {
        config
            .uarts
            .iter()
            .enumerate()
            .filter(|(_, uart)| uart.enabled && uart.baudrate != Some(115_200))
            .map(|(index, uart)| {
                let at = PeripheralRef::new(PeripheralKind::Uart, index, &uart.instance);
                Issue::warning(self.id(), &at, format!("{} is not at 115200", uart.instance))
                    .at("baudrate")
            })
            .collect()
    }
}

fn main() -> Result<(), periphgen::PeriphGenError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/warnings_only.yaml".to_string());
    let path = Path::new(&path);

    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        eprintln!("Usage: cargo run --example custom_rules [path/to/board.yaml]");
        std::process::exit(2);
    }

    let config = parse_file(path)?;
    let mut engine = RulesEngine::with_default_rules();
    engine.add_rule(Arc::new(HouseBaudRule));
    let issues = engine.analyze(&config);

    println!("Custom validation found {} issues for {}", issues.len(), path.display());
    for issue in &issues {
        println!("  [{}] {}", issue.rule_id, issue);
    }

    let errors = issues.iter().filter(|i| i.severity == Severity::Error).count();
    if errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}
