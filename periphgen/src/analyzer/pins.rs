//! GPIO pin rules.

use super::rules::{Issue, Rule};
use super::unknown_keyword;
use crate::model::pin::MAX_ALT_FUNCTION;
use crate::model::{
    AltFunction, Choice, Direction, Keyword, PeripheralConfig, PeripheralKind, PeripheralRef,
    PinConfig, PinId, Pull, Speed,
};
use std::collections::HashMap;

fn pin_ref(index: usize, pin: &PinConfig) -> PeripheralRef {
    PeripheralRef::new(PeripheralKind::Pin, index, &pin.pin)
}

pub struct PinIdentifierRule;

impl Rule for PinIdentifierRule {
    fn id(&self) -> &str {
        "pin_identifier"
    }

    fn name(&self) -> &str {
        "Pin identifier"
    }

    fn description(&self) -> &str {
        "Pin names follow P<port><number> with port A..=K and number 0..=15"
    }

    fn check(&self, config: &PeripheralConfig) -> Vec<Issue> {
        let mut issues = Vec::new();
        for (index, pin) in config.pins.iter().enumerate() {
            if let Err(e) = PinId::parse(&pin.pin) {
                issues.push(
                    Issue::error(self.id(), &pin_ref(index, pin), e.to_string())
                        .at("pin")
                        .suggest("Write pins as P<port><number>, e.g. PA9 or PD12"),
                );
            }
        }
        issues
    }
}

pub struct PinModeRule;

impl Rule for PinModeRule {
    fn id(&self) -> &str {
        "pin_mode"
    }

    fn name(&self) -> &str {
        "Pin mode"
    }

    fn description(&self) -> &str {
        "Direction, pull and speed keywords; GPIO_AF<N>_<PERIPH> selectors only on alternate-function pins"
    }

    fn check(&self, config: &PeripheralConfig) -> Vec<Issue> {
        let mut issues = Vec::new();
        for (index, pin) in config.pins.iter().enumerate() {
            let at = pin_ref(index, pin);
            if let Some(direction) = &pin.direction {
                issues.extend(unknown_keyword(self.id(), &at, "direction", direction));
            }
            issues.extend(unknown_keyword(self.id(), &at, "pull", &pin.pull));
            issues.extend(unknown_keyword(self.id(), &at, "speed", &pin.speed));

            if let Some(af) = &pin.alt_function {
                match AltFunction::parse(af) {
                    None => issues.push(
                        Issue::error(
                            self.id(),
                            &at,
                            format!(
                                "alternate function `{}` does not follow the GPIO_AF<N>_<PERIPH> naming convention",
                                af
                            ),
                        )
                        .at("alt_function")
                        .suggest("Use the HAL macro name, e.g. GPIO_AF7_USART1"),
                    ),
                    Some(parsed) if parsed.number > MAX_ALT_FUNCTION => issues.push(
                        Issue::error(
                            self.id(),
                            &at,
                            format!(
                                "alternate function number {} is out of range 0..={}",
                                parsed.number, MAX_ALT_FUNCTION
                            ),
                        )
                        .at("alt_function"),
                    ),
                    Some(_) => {}
                }
            }

            let direction = pin.direction.as_ref().and_then(Choice::known);
            match (direction, &pin.alt_function) {
                (Some(d), Some(_)) if !d.is_alternate() => issues.push(
                    Issue::error(
                        self.id(),
                        &at,
                        format!(
                            "alt_function is only valid on alternate-function pins, but {} is declared as {}",
                            pin.pin,
                            d.keyword()
                        ),
                    )
                    .at("alt_function"),
                ),
                (Some(d), None) if d.is_alternate() => issues.push(
                    Issue::error(
                        self.id(),
                        &at,
                        format!("alternate-function pin {} has no alt_function selector", pin.pin),
                    )
                    .at("alt_function")
                    .suggest("Add the HAL selector, e.g. alt_function: GPIO_AF7_USART1"),
                ),
                _ => {}
            }

            if direction == Some(Direction::Analog) && !pin.pull.is(Pull::None) {
                issues.push(
                    Issue::warning(
                        self.id(),
                        &at,
                        format!("pull {} has no effect on analog pin {}", pin.pull, pin.pin),
                    )
                    .at("pull"),
                );
            }
            if direction == Some(Direction::Input) && !pin.speed.is(Speed::Medium) {
                issues.push(
                    Issue::warning(
                        self.id(),
                        &at,
                        format!("speed {} has no effect on input pin {}", pin.speed, pin.pin),
                    )
                    .at("speed"),
                );
            }
        }
        issues
    }
}

pub struct PinConflictRule;

impl PinConflictRule {
    fn same_settings(a: &PinConfig, b: &PinConfig) -> bool {
        a.effective_direction() == b.effective_direction()
            && a.pull == b.pull
            && a.speed == b.speed
            && a.alt_function == b.alt_function
    }
}

impl Rule for PinConflictRule {
    fn id(&self) -> &str {
        "pin_conflict"
    }

    fn name(&self) -> &str {
        "Pin conflict"
    }

    fn description(&self) -> &str {
        "A physical pin is declared once unless every declaration is marked `shared: true` with identical settings"
    }

    fn check(&self, config: &PeripheralConfig) -> Vec<Issue> {
        let mut issues = Vec::new();
        let mut first_claim: HashMap<String, usize> = HashMap::new();
        for (index, pin) in config.pins.iter().enumerate() {
            let key = pin.claim_key();
            if key.is_empty() {
                continue;
            }
            let Some(&first_index) = first_claim.get(&key) else {
                first_claim.insert(key, index);
                continue;
            };
            let first = &config.pins[first_index];
            let first_ref = pin_ref(first_index, first);
            let current = pin_ref(index, pin);

            if !(first.shared && pin.shared) {
                issues.push(
                    Issue::error(
                        self.id(),
                        &current,
                        format!(
                            "pin {} is claimed by both {} and {}",
                            key,
                            first_ref.path(),
                            current.path()
                        ),
                    )
                    .at("pin")
                    .related_to(&first_ref)
                    .suggest("Remove one declaration or mark both with shared: true"),
                );
            } else if !Self::same_settings(first, pin) {
                issues.push(
                    Issue::error(
                        self.id(),
                        &current,
                        format!(
                            "shared pin {} is configured differently in {} and {}",
                            key,
                            first_ref.path(),
                            current.path()
                        ),
                    )
                    .at("pin")
                    .related_to(&first_ref),
                );
            }
        }
        issues
    }
}

pub struct PinCommentRule;

impl Rule for PinCommentRule {
    fn id(&self) -> &str {
        "pin_comment"
    }

    fn name(&self) -> &str {
        "Pin comment"
    }

    fn description(&self) -> &str {
        "Every pin carries a comment describing its board function"
    }

    fn check(&self, config: &PeripheralConfig) -> Vec<Issue> {
        config
            .pins
            .iter()
            .enumerate()
            .filter(|(_, pin)| {
                pin.comment
                    .as_deref()
                    .map(|c| c.trim().is_empty())
                    .unwrap_or(true)
            })
            .map(|(index, pin)| {
                Issue::warning(
                    self.id(),
                    &pin_ref(index, pin),
                    format!("pin {} has no comment", pin.pin),
                )
                .at("comment")
                .suggest("Describe what the pin is wired to; it is copied into the generated source")
            })
            .collect()
    }
}
