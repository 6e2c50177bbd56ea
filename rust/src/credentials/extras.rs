//! Extra secrets as the admin configuration (or an override) hands them over.
//!
//! The stored field is loosely shaped: a list of plain strings, a list of
//! `{label, password}` records from the admin repeater, or something else
//! entirely. Everything is mapped onto [`ExtraSecret`] up front so the matcher
//! only ever iterates normalized text.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Keys that may carry the secret inside a labeled record, in lookup order.
const SECRET_KEYS: [&str; 2] = ["secret", "password"];

/// One entry of the extras list.
#[derive(Clone, PartialEq, Eq)]
pub enum ExtraSecret {
    Plain(String),
    /// The label is metadata for administrators and never takes part in matching.
    Labeled {
        label: Option<String>,
        secret: String,
    },
    Invalid,
}

impl ExtraSecret {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(record) => {
                let secret = SECRET_KEYS
                    .iter()
                    .find_map(|key| record.get(*key))
                    .and_then(scalar_text);
                match secret {
                    Some(secret) => ExtraSecret::Labeled {
                        label: record.get("label").and_then(scalar_text),
                        secret,
                    },
                    None => ExtraSecret::Invalid,
                }
            }
            other => scalar_text(other).map_or(ExtraSecret::Invalid, ExtraSecret::Plain),
        }
    }

    /// Trimmed secret text, or `None` when the entry cannot take part in matching.
    pub fn normalized(&self) -> Option<&str> {
        match self {
            ExtraSecret::Plain(secret) | ExtraSecret::Labeled { secret, .. } => {
                let trimmed = secret.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            }
            ExtraSecret::Invalid => None,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            ExtraSecret::Labeled { label, .. } => label.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Debug for ExtraSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtraSecret::Plain(_) => f.write_str("Plain(<redacted>)"),
            ExtraSecret::Labeled { label, .. } => f
                .debug_struct("Labeled")
                .field("label", label)
                .field("secret", &"<redacted>")
                .finish(),
            ExtraSecret::Invalid => f.write_str("Invalid"),
        }
    }
}

/// Strings and numbers are accepted as secret text; any other shape is not.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// The extras field as a whole.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExtrasValue {
    /// Nothing configured: null, `false`, or an empty string.
    #[default]
    Absent,
    /// Configured, but not list-shaped.
    NotAList,
    List(Vec<ExtraSecret>),
}

impl ExtrasValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null | Value::Bool(false) => ExtrasValue::Absent,
            Value::String(text) if text.is_empty() => ExtrasValue::Absent,
            Value::Array(items) => ExtrasValue::List(items.iter().map(ExtraSecret::from_json).collect()),
            _ => ExtrasValue::NotAList,
        }
    }

    /// Builds a list of plain secrets.
    pub fn plain<I, S>(secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExtrasValue::List(secrets.into_iter().map(|s| ExtraSecret::Plain(s.into())).collect())
    }

    /// Normalized candidates in their original order. Invalid and blank entries
    /// are dropped; duplicates are kept.
    pub fn candidates(&self) -> Vec<&str> {
        match self {
            ExtrasValue::List(entries) => entries.iter().filter_map(ExtraSecret::normalized).collect(),
            ExtrasValue::Absent | ExtrasValue::NotAList => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates().is_empty()
    }
}

impl<'de> Deserialize<'de> for ExtrasValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(ExtrasValue::from_json(&value))
    }
}

/// A problem in the configured extras that the matcher would silently skip.
/// Entries are referenced by index so secrets never end up in logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtrasDiagnostic {
    NotAList,
    InvalidEntry { index: usize },
    BlankEntry { index: usize },
    Duplicate { index: usize, first: usize },
}

impl fmt::Display for ExtrasDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtrasDiagnostic::NotAList => write!(f, "extra passwords must be a list"),
            ExtrasDiagnostic::InvalidEntry { index } => {
                write!(f, "entry {} has no usable password and is ignored", index)
            }
            ExtrasDiagnostic::BlankEntry { index } => {
                write!(f, "entry {} is blank and is ignored", index)
            }
            ExtrasDiagnostic::Duplicate { index, first } => {
                write!(f, "entry {} repeats entry {}", index, first)
            }
        }
    }
}

/// Lists everything in `value` that will never match.
pub fn validate_extras(value: &ExtrasValue) -> Vec<ExtrasDiagnostic> {
    let entries = match value {
        ExtrasValue::Absent => return Vec::new(),
        ExtrasValue::NotAList => return vec![ExtrasDiagnostic::NotAList],
        ExtrasValue::List(entries) => entries,
    };

    let mut diagnostics = Vec::new();
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (index, entry) in entries.iter().enumerate() {
        match (entry, entry.normalized()) {
            (ExtraSecret::Invalid, _) => diagnostics.push(ExtrasDiagnostic::InvalidEntry { index }),
            (_, None) => diagnostics.push(ExtrasDiagnostic::BlankEntry { index }),
            (_, Some(secret)) => {
                if let Some(first) = seen.get(secret) {
                    diagnostics.push(ExtrasDiagnostic::Duplicate { index, first: *first });
                } else {
                    seen.insert(secret, index);
                }
            }
        }
    }
    diagnostics
}
