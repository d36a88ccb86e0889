//! Keyword-valued settings.
//!
//! Enumerated fields (pull mode, parity, counter mode, ...) are written as
//! plain words in the document. The parser keeps whatever the user wrote in a
//! [`Choice`] so that an unknown word becomes a validation issue instead of a
//! parse failure.

use serde::{Serialize, Serializer};
use std::fmt;

/// An enumeration that can be spelled as a document keyword.
///
/// `TABLE` lists every accepted spelling. Several spellings may map to the
/// same value; the first one is the canonical form.
pub trait Keyword: Copy + PartialEq + 'static {
    const TABLE: &'static [(&'static str, Self)];

    fn from_keyword(raw: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(word, _)| *word == raw)
            .map(|(_, value)| *value)
    }

    fn keyword(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(_, value)| *value == self)
            .map(|(word, _)| *word)
            .unwrap_or("?")
    }

    /// Canonical spellings, comma separated, for error messages.
    fn expected() -> String {
        let mut words: Vec<&str> = Vec::new();
        for (word, value) in Self::TABLE {
            if value.keyword() == *word {
                words.push(word);
            }
        }
        words.join(", ")
    }
}

/// A keyword as written in the document: either recognized or kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice<T> {
    Known(T),
    Unknown(String),
}

impl<T: Keyword> Choice<T> {
    pub fn parse(raw: &str) -> Self {
        match T::from_keyword(raw.trim()) {
            Some(value) => Choice::Known(value),
            None => Choice::Unknown(raw.to_string()),
        }
    }

    pub fn known(&self) -> Option<T> {
        match self {
            Choice::Known(value) => Some(*value),
            Choice::Unknown(_) => None,
        }
    }

    pub fn is(&self, value: T) -> bool {
        self.known() == Some(value)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Choice::Known(value) => value.keyword(),
            Choice::Unknown(raw) => raw,
        }
    }
}

impl<T> From<T> for Choice<T> {
    fn from(value: T) -> Self {
        Choice::Known(value)
    }
}

impl<T: Keyword> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<T: Keyword> Serialize for Choice<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
