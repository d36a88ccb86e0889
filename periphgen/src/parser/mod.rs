//! Document parsing: YAML text to [`PeripheralConfig`].
//!
//! Structural problems (bad YAML, unknown keys, wrong value types, missing
//! identifiers) stop the parse with a [`ParseError`]. Out-of-range values and
//! unrecognized keywords are kept in the model for the analyzer.

mod document;
mod fields;

pub use document::{parse_file, parse_str};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed document: {0}")]
    Syntax(#[from] serde_yaml::Error),
    #[error("{path}: unknown key")]
    UnknownKey { path: String },
    #[error("{path}: missing required field")]
    MissingField { path: String },
    #[error("{path}: expected {expected}, found {found}")]
    InvalidType {
        path: String,
        expected: &'static str,
        found: String,
    },
    #[error("{path}: conflicts with {other} (same field under two names)")]
    ConflictingKeys { path: String, other: String },
}

impl ParseError {
    /// Document path of the offending field, when the error has one.
    pub fn path(&self) -> Option<&str> {
        match self {
            ParseError::Io { .. } | ParseError::Syntax(_) => None,
            ParseError::UnknownKey { path }
            | ParseError::MissingField { path }
            | ParseError::InvalidType { path, .. }
            | ParseError::ConflictingKeys { path, .. } => Some(path),
        }
    }
}
