use super::keyword::{Choice, Keyword};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterMode {
    Up,
    Down,
    CenterAligned1,
    CenterAligned2,
    CenterAligned3,
}

impl Keyword for CounterMode {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("up", CounterMode::Up),
        ("down", CounterMode::Down),
        ("center_aligned1", CounterMode::CenterAligned1),
        ("center_aligned2", CounterMode::CenterAligned2),
        ("center_aligned3", CounterMode::CenterAligned3),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockDivision {
    Div1,
    Div2,
    Div4,
}

impl ClockDivision {
    pub fn from_divisor(divisor: i64) -> Option<Self> {
        match divisor {
            1 => Some(ClockDivision::Div1),
            2 => Some(ClockDivision::Div2),
            4 => Some(ClockDivision::Div4),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    Basic,
    Pwm,
}

impl Keyword for TimerMode {
    const TABLE: &'static [(&'static str, Self)] =
        &[("timer", TimerMode::Basic), ("pwm", TimerMode::Pwm)];
}

/// One entry of `timers`.
///
/// `prescaler` and `period` are divisor counts as a human would write them
/// (8400 divides by 8400); the register values are one less.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerConfig {
    pub instance: String,
    pub enabled: bool,
    pub prescaler: Option<i64>,
    pub period: Option<i64>,
    pub counter_mode: Choice<CounterMode>,
    pub clock_division: i64,
    pub mode: Choice<TimerMode>,
    pub channel: Option<i64>,
    pub duty_cycle: Option<i64>,
}

impl TimerConfig {
    /// TIM2 and TIM5 have 32-bit counters on STM32F4 parts.
    pub fn has_32bit_counter(&self) -> bool {
        matches!(self.instance.as_str(), "TIM2" | "TIM5")
    }
}
