//! Validation rules over a parsed [`PeripheralConfig`](crate::model::PeripheralConfig).

pub mod board;
pub mod comm;
pub mod pins;
pub mod report;
pub mod rules;
pub mod timers;

pub use report::{ValidationReport, ValidationStats};
pub use rules::{Issue, Rule, RulesEngine, Severity};

use crate::model::{Choice, Keyword, PeripheralKind, PeripheralRef};
use std::collections::HashMap;

/// Error for a keyword field holding a word outside its enumeration.
pub(crate) fn unknown_keyword<T: Keyword>(
    rule_id: &str,
    at: &PeripheralRef,
    field: &str,
    choice: &Choice<T>,
) -> Option<Issue> {
    match choice {
        Choice::Known(_) => None,
        Choice::Unknown(raw) => Some(
            Issue::error(
                rule_id,
                at,
                format!("unknown {} `{}`; expected one of {}", field, raw, T::expected()),
            )
            .at(field),
        ),
    }
}

/// Unit number of an instance name such as `USART2` for the given prefixes.
pub(crate) fn instance_number(name: &str, prefixes: &[&str]) -> Option<u32> {
    prefixes.iter().find_map(|prefix| {
        let digits = name.strip_prefix(prefix)?;
        if digits.is_empty()
            || digits.starts_with('0')
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        digits.parse().ok()
    })
}

/// One error per repeated instance, naming both entries.
///
/// Instances are keyed on their unit number, so `USART1` and `UART1` (both
/// driven through `huart1`) count as the same instance. Names that do not
/// parse are compared verbatim.
pub(crate) fn duplicate_instances<'a>(
    rule_id: &str,
    kind: PeripheralKind,
    prefixes: &[&str],
    names: impl Iterator<Item = &'a str>,
) -> Vec<Issue> {
    let mut seen: HashMap<String, PeripheralRef> = HashMap::new();
    let mut issues = Vec::new();
    for (index, name) in names.enumerate() {
        let current = PeripheralRef::new(kind, index, name);
        let key = match instance_number(name, prefixes) {
            Some(unit) => unit.to_string(),
            None => name.to_string(),
        };
        match seen.get(&key) {
            Some(first) => {
                let message = if first.name == name {
                    format!(
                        "{} is configured twice ({} and {})",
                        name,
                        first.path(),
                        current.path()
                    )
                } else {
                    format!(
                        "{} and {} share unit {} and one HAL handle ({} and {})",
                        first.name,
                        name,
                        key,
                        first.path(),
                        current.path()
                    )
                };
                issues.push(
                    Issue::error(rule_id, &current, message)
                        .at("instance")
                        .related_to(first),
                );
            }
            None => {
                seen.insert(key, current);
            }
        }
    }
    issues
}
