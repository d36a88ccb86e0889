//! GPIO pin entities.

use super::keyword::{Choice, Keyword};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Ports present on the supported STM32 families (GPIOA..GPIOK).
pub const SUPPORTED_PORTS: std::ops::RangeInclusive<char> = 'A'..='K';
pub const MAX_PIN_NUMBER: u32 = 15;
pub const MAX_ALT_FUNCTION: u32 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PinIdError {
    #[error("`{0}` does not match the P<port><number> pattern (e.g. PA9)")]
    Pattern(String),
    #[error("port {0} is not supported (expected A..=K)")]
    Port(char),
    #[error("pin number {0} is out of range 0..=15")]
    Number(u32),
}

/// Physical pin identifier, ordered by port then pin number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PinId {
    pub port: char,
    pub number: u8,
}

impl PinId {
    pub fn parse(raw: &str) -> Result<Self, PinIdError> {
        let pattern = || PinIdError::Pattern(raw.to_string());
        let mut chars = raw.chars();
        if chars.next() != Some('P') {
            return Err(pattern());
        }
        let port = chars.next().filter(|c| c.is_ascii_uppercase()).ok_or_else(pattern)?;
        let digits = chars.as_str();
        if digits.is_empty()
            || !digits.bytes().all(|b| b.is_ascii_digit())
            || (digits.len() > 1 && digits.starts_with('0'))
        {
            return Err(pattern());
        }
        let number: u32 = digits.parse().map_err(|_| pattern())?;
        if !SUPPORTED_PORTS.contains(&port) {
            return Err(PinIdError::Port(port));
        }
        if number > MAX_PIN_NUMBER {
            return Err(PinIdError::Number(number));
        }
        Ok(PinId {
            port,
            number: number as u8,
        })
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}{}", self.port, self.number)
    }
}

/// A `GPIO_AF<N>_<PERIPH>` selector split into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AltFunction<'a> {
    pub number: u32,
    pub target: &'a str,
}

impl<'a> AltFunction<'a> {
    /// Returns `None` when the name does not follow the HAL naming convention.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let rest = raw.strip_prefix("GPIO_AF")?;
        let (number, target) = rest.split_once('_')?;
        if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if target.is_empty()
            || !target
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
        {
            return None;
        }
        Some(AltFunction {
            number: number.parse().ok()?,
            target,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
    OutputOpenDrain,
    Alternate,
    AlternateOpenDrain,
    Analog,
}

impl Direction {
    pub fn is_alternate(self) -> bool {
        matches!(self, Direction::Alternate | Direction::AlternateOpenDrain)
    }
}

impl Keyword for Direction {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("input", Direction::Input),
        ("output", Direction::Output),
        ("output_open_drain", Direction::OutputOpenDrain),
        ("alternate", Direction::Alternate),
        ("alternate_open_drain", Direction::AlternateOpenDrain),
        ("analog", Direction::Analog),
        ("output_push_pull", Direction::Output),
        ("alternate_function", Direction::Alternate),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pull {
    None,
    Up,
    Down,
}

impl Keyword for Pull {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("none", Pull::None),
        ("pull_up", Pull::Up),
        ("pull_down", Pull::Down),
        ("up", Pull::Up),
        ("down", Pull::Down),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Keyword for Speed {
    const TABLE: &'static [(&'static str, Self)] = &[
        ("low", Speed::Low),
        ("medium", Speed::Medium),
        ("high", Speed::High),
        ("very_high", Speed::VeryHigh),
    ];
}

/// One entry of `gpio.pins`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PinConfig {
    pub pin: String,
    /// Left empty when the document omits it; the normalizer derives it from
    /// `alt_function`.
    pub direction: Option<Choice<Direction>>,
    pub pull: Choice<Pull>,
    pub speed: Choice<Speed>,
    pub alt_function: Option<String>,
    pub comment: Option<String>,
    pub shared: bool,
}

impl PinConfig {
    pub fn id(&self) -> Option<PinId> {
        PinId::parse(&self.pin).ok()
    }

    /// Direction after applying the documented default, if recognizable.
    pub fn effective_direction(&self) -> Option<Direction> {
        match &self.direction {
            Some(choice) => choice.known(),
            None => Some(super::defaults::direction_for(self.alt_function.as_deref())),
        }
    }

    pub fn has_alternate_role(&self) -> bool {
        self.effective_direction()
            .map(Direction::is_alternate)
            .unwrap_or(false)
    }

    /// Identifier used for conflict detection: the canonical form when the
    /// identifier parses, the raw text otherwise.
    pub fn claim_key(&self) -> String {
        self.id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| self.pin.trim().to_string())
    }

    pub fn matches(&self, reference: &str) -> bool {
        match (self.id(), PinId::parse(reference.trim())) {
            (Some(a), Ok(b)) => a == b,
            _ => self.pin.trim() == reference.trim(),
        }
    }
}
