use crate::analyzer::report::ValidationReport;
use crate::core::ValidationOptions;
use crate::model::{PeripheralConfig, PeripheralRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks generation.
    Error,
    /// Reported, never blocks generation.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Issue {
    pub rule_id: String,
    pub severity: Severity,
    pub peripheral: PeripheralRef,
    /// Full document path of the field at fault, e.g. `timers[0].period`.
    pub field: Option<String>,
    pub message: String,
    /// Second entry involved in a conflict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related: Option<PeripheralRef>,
    pub suggestion: Option<String>,
}

impl Issue {
    pub fn error(rule_id: &str, peripheral: &PeripheralRef, message: impl Into<String>) -> Self {
        Self::new(rule_id, Severity::Error, peripheral, message.into())
    }

    pub fn warning(rule_id: &str, peripheral: &PeripheralRef, message: impl Into<String>) -> Self {
        Self::new(rule_id, Severity::Warning, peripheral, message.into())
    }

    fn new(rule_id: &str, severity: Severity, peripheral: &PeripheralRef, message: String) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            severity,
            peripheral: peripheral.clone(),
            field: None,
            message,
            related: None,
            suggestion: None,
        }
    }

    pub fn at(mut self, field: &str) -> Self {
        self.field = Some(self.peripheral.field(field));
        self
    }

    pub fn related_to(mut self, other: &PeripheralRef) -> Self {
        self.related = Some(other.clone());
        self
    }

    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Field path when known, otherwise the entity path.
    pub fn location(&self) -> String {
        self.field
            .clone()
            .unwrap_or_else(|| self.peripheral.path())
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.location(), self.message)
    }
}

pub trait Rule: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn check(&self, config: &PeripheralConfig) -> Vec<Issue>;
}

pub struct RulesEngine {
    rules: Vec<Arc<dyn Rule>>,
}

impl RulesEngine {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_default_rules() -> Self {
        use crate::analyzer::{board, comm, pins, timers};

        let mut engine = Self::new();
        engine.add_rule(Arc::new(pins::PinIdentifierRule));
        engine.add_rule(Arc::new(pins::PinModeRule));
        engine.add_rule(Arc::new(pins::PinConflictRule));
        engine.add_rule(Arc::new(pins::PinCommentRule));
        engine.add_rule(Arc::new(comm::UartSettingsRule));
        engine.add_rule(Arc::new(comm::I2cSettingsRule));
        engine.add_rule(Arc::new(timers::TimerSettingsRule));
        engine.add_rule(Arc::new(comm::PinReferenceRule));
        engine.add_rule(Arc::new(board::BoardRule));
        engine
    }

    pub fn add_rule(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    /// Run every rule and collect issues in rule order.
    pub fn analyze(&self, config: &PeripheralConfig) -> Vec<Issue> {
        let mut issues = Vec::new();
        for rule in &self.rules {
            issues.extend(rule.check(config));
        }
        issues
    }

    /// Run the selected rules and build a report, promoting warnings to
    /// errors in strict mode.
    pub fn validate(&self, config: &PeripheralConfig, options: &ValidationOptions) -> ValidationReport {
        let mut issues = Vec::new();
        for rule in &self.rules {
            if !options.rules.is_empty() && !options.rules.iter().any(|id| id == rule.id()) {
                continue;
            }
            let found = rule.check(config);
            tracing::debug!("Rule {} reported {} issue(s)", rule.id(), found.len());
            issues.extend(found);
        }
        if options.strict {
            for issue in &mut issues {
                issue.severity = Severity::Error;
            }
        }
        ValidationReport::new(issues)
    }
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::with_default_rules()
    }
}
