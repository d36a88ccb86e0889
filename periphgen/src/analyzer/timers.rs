//! Timer rules.

use super::rules::{Issue, Rule};
use super::{duplicate_instances, instance_number, unknown_keyword};
use crate::model::{ClockDivision, PeripheralConfig, PeripheralKind, PeripheralRef, TimerConfig, TimerMode};

/// Largest divisor a 16-bit prescaler or auto-reload register can express.
pub const MAX_DIVISOR_16BIT: i64 = 1 << 16;
pub const MAX_DIVISOR_32BIT: i64 = 1 << 32;
pub const MIN_UPDATE_HZ: f64 = 0.01;
pub const MAX_UPDATE_HZ: f64 = 1_000_000.0;
pub const MAX_PWM_CHANNEL: i64 = 4;

const TIMER_PREFIXES: &[&str] = &["TIM"];

/// Update event rate for a timer clocked at `clock_hz`, when both divisors
/// are usable.
pub fn update_frequency(clock_hz: i64, timer: &TimerConfig) -> Option<f64> {
    match (timer.prescaler, timer.period) {
        (Some(prescaler), Some(period)) if prescaler > 0 && period > 0 => {
            Some(clock_hz as f64 / (prescaler as f64 * period as f64))
        }
        _ => None,
    }
}

pub struct TimerSettingsRule;

impl TimerSettingsRule {
    fn check_divisor(
        &self,
        at: &PeripheralRef,
        timer: &TimerConfig,
        field: &str,
        value: Option<i64>,
        limit: i64,
        issues: &mut Vec<Issue>,
    ) {
        match value {
            None if timer.enabled => issues.push(
                Issue::error(
                    self.id(),
                    at,
                    format!("enabled {} has no {}", timer.instance, field),
                )
                .at(field),
            ),
            None => {}
            Some(v) if v < 1 => issues.push(
                Issue::error(self.id(), at, format!("{} must be at least 1, got {}", field, v))
                    .at(field),
            ),
            Some(v) if v > limit => issues.push(
                Issue::error(
                    self.id(),
                    at,
                    format!("{} {} exceeds the {} limit of {}", field, v, timer.instance, limit),
                )
                .at(field),
            ),
            Some(_) => {}
        }
    }

    fn check_pwm(&self, at: &PeripheralRef, timer: &TimerConfig, issues: &mut Vec<Issue>) {
        let pwm = timer.mode.is(TimerMode::Pwm);
        if !pwm {
            for (field, value) in [("channel", timer.channel), ("duty_cycle", timer.duty_cycle)] {
                if value.is_some() && timer.mode.known().is_some() {
                    issues.push(
                        Issue::warning(
                            self.id(),
                            at,
                            format!("{} is ignored outside pwm mode", field),
                        )
                        .at(field),
                    );
                }
            }
            return;
        }

        match timer.channel {
            None => issues.push(
                Issue::error(self.id(), at, format!("pwm timer {} has no channel", timer.instance))
                    .at("channel"),
            ),
            Some(c) if !(1..=MAX_PWM_CHANNEL).contains(&c) => issues.push(
                Issue::error(
                    self.id(),
                    at,
                    format!("channel must be 1..={}, got {}", MAX_PWM_CHANNEL, c),
                )
                .at("channel"),
            ),
            Some(_) => {}
        }
        match timer.duty_cycle {
            None => issues.push(
                Issue::error(
                    self.id(),
                    at,
                    format!("pwm timer {} has no duty_cycle", timer.instance),
                )
                .at("duty_cycle"),
            ),
            Some(d) if !(0..=100).contains(&d) => issues.push(
                Issue::error(self.id(), at, format!("duty cycle must be 0..=100 %, got {}", d))
                    .at("duty_cycle"),
            ),
            Some(_) => {}
        }
    }
}

impl Rule for TimerSettingsRule {
    fn id(&self) -> &str {
        "timer_settings"
    }

    fn name(&self) -> &str {
        "Timer settings"
    }

    fn description(&self) -> &str {
        "Instance name, prescaler and period within the counter width, update frequency 0.01 Hz..=1 MHz, PWM channel and duty"
    }

    fn check(&self, config: &PeripheralConfig) -> Vec<Issue> {
        let clock_hz = config.board.timer_clock_hz();
        let mut issues = Vec::new();
        for (index, timer) in config.timers.iter().enumerate() {
            let at = PeripheralRef::new(PeripheralKind::Timer, index, &timer.instance);

            if instance_number(&timer.instance, TIMER_PREFIXES).is_none() {
                issues.push(
                    Issue::error(
                        self.id(),
                        &at,
                        format!("`{}` is not a timer instance (expected TIM<n>)", timer.instance),
                    )
                    .at("instance"),
                );
            }

            let limit = if timer.has_32bit_counter() {
                MAX_DIVISOR_32BIT
            } else {
                MAX_DIVISOR_16BIT
            };
            // The prescaler register is 16 bits wide on every timer.
            self.check_divisor(&at, timer, "prescaler", timer.prescaler, MAX_DIVISOR_16BIT, &mut issues);
            self.check_divisor(&at, timer, "period", timer.period, limit, &mut issues);

            issues.extend(unknown_keyword(self.id(), &at, "counter_mode", &timer.counter_mode));
            if ClockDivision::from_divisor(timer.clock_division).is_none() {
                issues.push(
                    Issue::error(
                        self.id(),
                        &at,
                        format!("clock division must be 1, 2 or 4, got {}", timer.clock_division),
                    )
                    .at("clock_division"),
                );
            }
            issues.extend(unknown_keyword(self.id(), &at, "mode", &timer.mode));

            if let Some(hz) = update_frequency(clock_hz, timer) {
                if !(MIN_UPDATE_HZ..=MAX_UPDATE_HZ).contains(&hz) {
                    issues.push(
                        Issue::error(
                            self.id(),
                            &at,
                            format!(
                                "update frequency {:.3} Hz is outside {} Hz..={} Hz",
                                hz, MIN_UPDATE_HZ, MAX_UPDATE_HZ
                            ),
                        )
                        .at("period")
                        .suggest(format!(
                            "Timer clock is {} Hz; adjust prescaler or period",
                            clock_hz
                        )),
                    );
                }
            }

            self.check_pwm(&at, timer, &mut issues);
        }

        issues.extend(duplicate_instances(
            self.id(),
            PeripheralKind::Timer,
            TIMER_PREFIXES,
            config.timers.iter().map(|t| t.instance.as_str()),
        ));
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Severity;
    use crate::parser::parse_str;

    fn run(yaml: &str) -> Vec<Issue> {
        TimerSettingsRule.check(&parse_str(yaml).unwrap())
    }

    fn timer(instance: &str, extra: &str) -> String {
        format!("timers:\n  - instance: {}\n{}", instance, extra)
    }

    #[test]
    fn test_one_hertz_tick_is_clean() {
        assert!(run(&timer("TIM3", "    prescaler: 8400\n    period: 10000\n")).is_empty());
    }

    #[test]
    fn test_zero_period() {
        let issues = run(&timer("TIM3", "    prescaler: 8400\n    period: 0\n"));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field.as_deref(), Some("timers[0].period"));
    }

    #[test]
    fn test_period_width_depends_on_instance() {
        let yaml = |instance: &str| timer(instance, "    prescaler: 1\n    period: 100000\n");
        assert_eq!(run(&yaml("TIM3")).len(), 1);
        assert!(run(&yaml("TIM2")).is_empty());
    }

    #[test]
    fn test_missing_divisors_only_matter_when_enabled() {
        assert_eq!(run(&timer("TIM4", "")).len(), 2);
        assert!(run(&timer("TIM4", "    enabled: false\n")).is_empty());
    }

    #[test]
    fn test_update_frequency_bounds() {
        // 84 MHz / 1 / 2 = 42 MHz
        let issues = run(&timer("TIM3", "    prescaler: 1\n    period: 2\n"));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("update frequency"));

        let slow = format!(
            "board:\n  clock_freq: 1000\n{}",
            timer("TIM3", "    prescaler: 65536\n    period: 65536\n")
        );
        assert_eq!(run(&slow).len(), 1);
    }

    #[test]
    fn test_clock_division_and_counter_mode() {
        let issues = run(&timer(
            "TIM3",
            "    prescaler: 84\n    period: 1000\n    clock_division: 3\n    counter_mode: sideways\n",
        ));
        let fields: Vec<_> = issues.iter().filter_map(|i| i.field.as_deref()).collect();
        assert_eq!(fields, ["timers[0].counter_mode", "timers[0].clock_division"]);
    }

    #[test]
    fn test_pwm_requires_channel_and_duty() {
        let issues = run(&timer("TIM4", "    prescaler: 84\n    period: 1000\n    mode: pwm\n"));
        assert_eq!(issues.len(), 2);

        let issues = run(&timer(
            "TIM4",
            "    prescaler: 84\n    period: 1000\n    mode: pwm\n    channel: 5\n    duty_cycle: 150\n",
        ));
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.severity == Severity::Error));

        assert!(run(&timer(
            "TIM4",
            "    prescaler: 84\n    period: 1000\n    mode: pwm\n    channel: 1\n    duty_cycle: 25\n",
        ))
        .is_empty());
    }

    #[test]
    fn test_channel_outside_pwm_is_a_warning() {
        let issues = run(&timer("TIM4", "    prescaler: 84\n    period: 1000\n    channel: 2\n"));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_duplicate_and_misnamed_instances() {
        let yaml = "timers:\n  - instance: TIM2\n    prescaler: 84\n    period: 1000\n  - instance: TIMER2\n    prescaler: 84\n    period: 1000\n  - instance: TIM2\n    prescaler: 84\n    period: 1000\n";
        let issues = run(yaml);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].field.as_deref(), Some("timers[1].instance"));
        assert!(issues[1].message.contains("configured twice"));
    }
}
