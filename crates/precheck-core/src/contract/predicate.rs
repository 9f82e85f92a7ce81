//! Value predicates used by field rules.
//!
//! Predicates are plain tagged data so that schema definitions can be
//! written in YAML/JSON as well as built in code.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// JSON value kinds a field can be required to have.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    /// Any JSON number, integer or float.
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl ValueType {
    /// Whether `value` is of this kind.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            ValueType::String => value.is_string(),
            ValueType::Number => value.is_number(),
            ValueType::Integer => value.is_i64() || value.is_u64(),
            ValueType::Boolean => value.is_boolean(),
            ValueType::Object => value.is_object(),
            ValueType::Array => value.is_array(),
            ValueType::Null => value.is_null(),
        }
    }

    /// Kind of an arbitrary value, for diagnostics.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => ValueType::String,
            Value::Number(n) if n.is_f64() => ValueType::Number,
            Value::Number(_) => ValueType::Integer,
            Value::Bool(_) => ValueType::Boolean,
            Value::Object(_) => ValueType::Object,
            Value::Array(_) => ValueType::Array,
            Value::Null => ValueType::Null,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Integer => "integer",
            ValueType::Boolean => "boolean",
            ValueType::Object => "object",
            ValueType::Array => "array",
            ValueType::Null => "null",
        };
        f.write_str(name)
    }
}

/// A compiled regular expression that serializes as its source text.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source).map_err(serde::de::Error::custom)
    }
}

/// A constraint on a single field value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Value has the given JSON kind.
    Type(ValueType),

    /// Array element count or string character count equals `n`.
    Length(usize),

    /// Array element count or string character count within `[min, max]`.
    LengthBetween { min: usize, max: usize },

    /// Value is an array and every element satisfies the inner predicate.
    Each(Box<Predicate>),

    /// Value is a string matching the pattern.
    Matches(Pattern),

    /// Value is a string drawn from a fixed set.
    OneOf(Vec<String>),

    /// Value is a string with at least one cased character and no uppercase.
    Lowercase,
}

impl Predicate {
    /// Check a value, returning a human-readable reason on failure.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Predicate::Type(expected) => {
                if expected.matches(value) {
                    Ok(())
                } else {
                    Err(format!("expected {}, found {}", expected, ValueType::of(value)))
                }
            }
            Predicate::Length(n) => {
                let len = measure(value)?;
                if len == *n {
                    Ok(())
                } else {
                    Err(format!("expected length {}, found {}", n, len))
                }
            }
            Predicate::LengthBetween { min, max } => {
                let len = measure(value)?;
                if (*min..=*max).contains(&len) {
                    Ok(())
                } else {
                    Err(format!("expected length in [{}, {}], found {}", min, max, len))
                }
            }
            Predicate::Each(inner) => {
                let items = value
                    .as_array()
                    .ok_or_else(|| format!("expected array, found {}", ValueType::of(value)))?;
                for (index, item) in items.iter().enumerate() {
                    inner
                        .check(item)
                        .map_err(|reason| format!("element {}: {}", index, reason))?;
                }
                Ok(())
            }
            Predicate::Matches(pattern) => {
                let text = expect_str(value)?;
                if pattern.is_match(text) {
                    Ok(())
                } else {
                    Err(format!("'{}' does not match {}", text, pattern.as_str()))
                }
            }
            Predicate::OneOf(allowed) => {
                let text = expect_str(value)?;
                if allowed.iter().any(|a| a == text) {
                    Ok(())
                } else {
                    Err(format!("'{}' is not one of {:?}", text, allowed))
                }
            }
            Predicate::Lowercase => {
                let text = expect_str(value)?;
                let has_lower = text.chars().any(char::is_lowercase);
                let has_upper = text.chars().any(char::is_uppercase);
                if has_lower && !has_upper {
                    Ok(())
                } else {
                    Err(format!("'{}' is not lowercase", text))
                }
            }
        }
    }
}

fn measure(value: &Value) -> Result<usize, String> {
    match value {
        Value::Array(items) => Ok(items.len()),
        Value::String(text) => Ok(text.chars().count()),
        other => Err(format!(
            "expected array or string, found {}",
            ValueType::of(other)
        )),
    }
}

fn expect_str(value: &Value) -> Result<&str, String> {
    value
        .as_str()
        .ok_or_else(|| format!("expected string, found {}", ValueType::of(value)))
}
