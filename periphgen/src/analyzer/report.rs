use crate::analyzer::rules::{Issue, Severity};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationStats {
    pub errors: usize,
    pub warnings: usize,
}

/// Outcome of one validation pass, in rule order.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    issues: Vec<Issue>,
    stats: ValidationStats,
}

impl ValidationReport {
    pub fn new(issues: Vec<Issue>) -> Self {
        let stats = issues_to_stats(&issues);
        Self { issues, stats }
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn stats(&self) -> ValidationStats {
        self.stats
    }

    pub fn has_errors(&self) -> bool {
        self.stats.errors > 0
    }

    /// No errors; warnings are allowed.
    pub fn passed(&self) -> bool {
        !self.has_errors()
    }

    pub fn total_issues(&self) -> usize {
        self.stats.errors + self.stats.warnings
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.with_severity(Severity::Warning)
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }
}

fn issues_to_stats(issues: &[Issue]) -> ValidationStats {
    let mut stats = ValidationStats::default();
    for issue in issues {
        match issue.severity {
            Severity::Error => stats.errors += 1,
            Severity::Warning => stats.warnings += 1,
        }
    }
    stats
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for issue in &self.issues {
            writeln!(f, "{}", issue)?;
        }
        write!(
            f,
            "{} error(s), {} warning(s)",
            self.stats.errors, self.stats.warnings
        )
    }
}
