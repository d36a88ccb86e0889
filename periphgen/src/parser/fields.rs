//! Path-aware access to YAML mappings.
//!
//! Every accessor reports failures against the full document path of the
//! field (`communication.uart[0].baudrate`) so that users can find the
//! offending line without a schema at hand.

use super::ParseError;
use crate::model::{Choice, Keyword};
use serde_yaml::{Mapping, Value};

pub(crate) struct Fields<'a> {
    path: String,
    map: &'a Mapping,
}

impl<'a> Fields<'a> {
    /// The document root. Its children have bare paths (`gpio`, `timers`).
    pub fn root(value: &'a Value) -> Result<Self, ParseError> {
        let map = expect_mapping("document", value)?;
        Ok(Self {
            path: String::new(),
            map,
        })
    }

    pub fn new(path: String, value: &'a Value) -> Result<Self, ParseError> {
        let map = expect_mapping(&path, value)?;
        Ok(Self { path, map })
    }

    pub fn child_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    /// Rejects keys outside `allowed`, naming the first offender.
    pub fn allow_only(&self, allowed: &[&str]) -> Result<(), ParseError> {
        for key in self.map.keys() {
            match key.as_str() {
                Some(name) if allowed.contains(&name) => {}
                Some(name) => {
                    return Err(ParseError::UnknownKey {
                        path: self.child_path(name),
                    })
                }
                None => {
                    return Err(ParseError::InvalidType {
                        path: self.child_path(&describe(key)),
                        expected: "string key",
                        found: describe(key),
                    })
                }
            }
        }
        Ok(())
    }

    /// Looks a field up under its name or any alias. Explicit `null` counts
    /// as absent.
    fn lookup(&self, names: &[&str]) -> Result<Option<(String, &'a Value)>, ParseError> {
        let mut found: Option<(String, &'a Value)> = None;
        for name in names {
            let Some(value) = self.map.get(*name) else {
                continue;
            };
            if let Some((first, _)) = &found {
                return Err(ParseError::ConflictingKeys {
                    path: self.child_path(name),
                    other: first.clone(),
                });
            }
            found = Some((self.child_path(name), value));
        }
        Ok(found.filter(|(_, value)| !value.is_null()))
    }

    pub fn string(&self, name: &str) -> Result<Option<String>, ParseError> {
        self.string_any(&[name])
    }

    pub fn string_any(&self, names: &[&str]) -> Result<Option<String>, ParseError> {
        match self.lookup(names)? {
            None => Ok(None),
            Some((_, Value::String(s))) => Ok(Some(s.clone())),
            Some((path, other)) => Err(ParseError::InvalidType {
                path,
                expected: "string",
                found: describe(other),
            }),
        }
    }

    pub fn required_string(&self, name: &str) -> Result<String, ParseError> {
        self.string(name)?.ok_or_else(|| ParseError::MissingField {
            path: self.child_path(name),
        })
    }

    pub fn integer(&self, name: &str) -> Result<Option<i64>, ParseError> {
        self.integer_any(&[name])
    }

    pub fn integer_any(&self, names: &[&str]) -> Result<Option<i64>, ParseError> {
        match self.lookup(names)? {
            None => Ok(None),
            Some((path, value)) => match value {
                Value::Number(n) => n.as_i64().map(Some).ok_or(ParseError::InvalidType {
                    path,
                    expected: "integer",
                    found: describe(value),
                }),
                other => Err(ParseError::InvalidType {
                    path,
                    expected: "integer",
                    found: describe(other),
                }),
            },
        }
    }

    pub fn boolean(&self, name: &str) -> Result<Option<bool>, ParseError> {
        match self.lookup(&[name])? {
            None => Ok(None),
            Some((_, Value::Bool(b))) => Ok(Some(*b)),
            Some((path, other)) => Err(ParseError::InvalidType {
                path,
                expected: "boolean",
                found: describe(other),
            }),
        }
    }

    /// Keywords may be written as strings or bare numbers (`duty_cycle: 2`).
    /// Unrecognized words are kept for the analyzer to report.
    pub fn keyword<T: Keyword>(&self, name: &str) -> Result<Option<Choice<T>>, ParseError> {
        match self.lookup(&[name])? {
            None => Ok(None),
            Some((_, Value::String(s))) => Ok(Some(Choice::parse(s))),
            Some((_, Value::Number(n))) => Ok(Some(Choice::parse(&n.to_string()))),
            Some((path, other)) => Err(ParseError::InvalidType {
                path,
                expected: "keyword",
                found: describe(other),
            }),
        }
    }

    pub fn section(&self, name: &str) -> Result<Option<Fields<'a>>, ParseError> {
        match self.lookup(&[name])? {
            None => Ok(None),
            Some((path, value)) => Fields::new(path, value).map(Some),
        }
    }

    /// Entries of a sequence field paired with their `path[i]`. Absent means
    /// empty.
    pub fn entries(&self, name: &str) -> Result<Vec<(String, &'a Value)>, ParseError> {
        match self.lookup(&[name])? {
            None => Ok(Vec::new()),
            Some((path, Value::Sequence(items))) => Ok(items
                .iter()
                .enumerate()
                .map(|(i, item)| (format!("{}[{}]", path, i), item))
                .collect()),
            Some((path, other)) => Err(ParseError::InvalidType {
                path,
                expected: "sequence",
                found: describe(other),
            }),
        }
    }
}

fn expect_mapping<'a>(path: &str, value: &'a Value) -> Result<&'a Mapping, ParseError> {
    match value {
        Value::Mapping(map) => Ok(map),
        other => Err(ParseError::InvalidType {
            path: path.to_string(),
            expected: "mapping",
            found: describe(other),
        }),
    }
}

/// Short human description of a YAML value for error messages.
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) => format!("string {:?}", s),
        Value::Sequence(_) => "sequence".to_string(),
        Value::Mapping(_) => "mapping".to_string(),
        Value::Tagged(tagged) => format!("tagged value {}", tagged.tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Pull;

    fn yaml(src: &str) -> Value {
        serde_yaml::from_str(src).unwrap()
    }

    #[test]
    fn test_child_paths() {
        let doc = yaml("gpio: {pins: []}");
        let root = Fields::root(&doc).unwrap();
        assert_eq!(root.child_path("gpio"), "gpio");
        let gpio = root.section("gpio").unwrap().unwrap();
        assert_eq!(gpio.child_path("pins"), "gpio.pins");
    }

    #[test]
    fn test_unknown_key_names_full_path() {
        let doc = yaml("pin: PA9\ncolour: red\n");
        let fields = Fields::new("gpio.pins[2]".to_string(), &doc).unwrap();
        let err = fields.allow_only(&["pin"]).unwrap_err();
        assert_eq!(err.path(), Some("gpio.pins[2].colour"));
    }

    #[test]
    fn test_integer_type_mismatch() {
        let doc = yaml("baudrate: fast\n");
        let fields = Fields::new("communication.uart[0]".to_string(), &doc).unwrap();
        match fields.integer("baudrate").unwrap_err() {
            ParseError::InvalidType { path, expected, found } => {
                assert_eq!(path, "communication.uart[0].baudrate");
                assert_eq!(expected, "integer");
                assert_eq!(found, "string \"fast\"");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_float_is_not_an_integer() {
        let doc = yaml("period: 1.5\n");
        let fields = Fields::new("timers[0]".to_string(), &doc).unwrap();
        assert!(fields.integer("period").is_err());
    }

    #[test]
    fn test_null_counts_as_absent() {
        let doc = yaml("comment:\n");
        let fields = Fields::new("gpio.pins[0]".to_string(), &doc).unwrap();
        assert_eq!(fields.string("comment").unwrap(), None);
    }

    #[test]
    fn test_alias_conflict() {
        let doc = yaml("data_bits: 8\nword_length: 9\n");
        let fields = Fields::new("communication.uart[0]".to_string(), &doc).unwrap();
        let err = fields.integer_any(&["data_bits", "word_length"]).unwrap_err();
        assert_eq!(err.path(), Some("communication.uart[0].word_length"));
    }

    #[test]
    fn test_keyword_keeps_unknown_words() {
        let doc = yaml("pull: sideways\n");
        let fields = Fields::new("gpio.pins[0]".to_string(), &doc).unwrap();
        let pull = fields.keyword::<Pull>("pull").unwrap().unwrap();
        assert_eq!(pull, Choice::Unknown("sideways".to_string()));
    }

    #[test]
    fn test_keyword_rejects_booleans() {
        let doc = yaml("pull: true\n");
        let fields = Fields::new("gpio.pins[0]".to_string(), &doc).unwrap();
        assert!(fields.keyword::<Pull>("pull").is_err());
    }
}
