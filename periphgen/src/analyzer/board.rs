use super::rules::{Issue, Rule};
use crate::model::{PeripheralConfig, PeripheralKind, PeripheralRef};

pub struct BoardRule;

impl Rule for BoardRule {
    fn id(&self) -> &str {
        "board"
    }

    fn name(&self) -> &str {
        "Board"
    }

    fn description(&self) -> &str {
        "The MCU belongs to a known STM32 series with a supported I2C HAL, and the timer clock is positive"
    }

    fn check(&self, config: &PeripheralConfig) -> Vec<Issue> {
        let board = &config.board;
        let at = PeripheralRef::board(config);
        let mut issues = Vec::new();

        if let Some(mcu) = &board.mcu {
            if board.hal_family().is_none() {
                issues.push(
                    Issue::warning(
                        self.id(),
                        &at,
                        format!("unrecognized MCU `{}`; falling back to the STM32F4 HAL header", mcu),
                    )
                    .at("mcu")
                    .suggest("Use a full part number such as STM32F407VG"),
                );
            }
        }

        if !board.i2c_uses_clock_speed() {
            if let Some((index, i2c)) = config.i2cs.iter().enumerate().find(|(_, i2c)| i2c.enabled) {
                let series = board.series().unwrap_or_default();
                issues.push(
                    Issue::error(
                        self.id(),
                        &at,
                        format!(
                            "STM32{} I2C is configured through Init.Timing; {} cannot be generated for it",
                            series, i2c.instance
                        ),
                    )
                    .at("mcu")
                    .related_to(&PeripheralRef::new(PeripheralKind::I2c, index, i2c.instance.as_str()))
                    .suggest("Disable the I2C instances or target an F1, F2, F4 or L1 part"),
                );
            }
        }

        if let Some(hz) = board.clock_freq {
            if hz <= 0 {
                issues.push(
                    Issue::error(self.id(), &at, format!("clock frequency must be positive, got {}", hz))
                        .at("clock_freq"),
                );
            }
        }
        issues
    }
}
