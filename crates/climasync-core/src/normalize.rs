//! Field value normalization.
//!
//! Local and remote values are compared in a canonical form so that
//! cosmetic differences (`"1"` vs `1` vs `true`, `["Lima","Cusco"]` vs
//! `"Lima-Cusco"`, stray whitespace) never trigger an update. The
//! normalized form is also what goes on the wire, so a value we wrote
//! reads back equal to itself on the next run.

use std::collections::HashSet;
use std::fmt;

use serde_json::Value;

use crate::record::fields;

/// Separator used when flattening list-valued fields.
pub const LIST_SEPARATOR: &str = "-";

/// How a field is interpreted before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Boolean,
    List,
    Text,
}

/// Canonical comparable form of a field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedValue {
    Bool(bool),
    /// A string in a boolean field that is not a recognized spelling,
    /// kept lowercased and trimmed.
    Unrecognized(String),
    Text(String),
}

impl NormalizedValue {
    pub fn is_true(&self) -> bool {
        matches!(self, Self::Bool(true))
    }

    /// The JSON value sent to Mautic.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Unrecognized(s) | Self::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for NormalizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Unrecognized(s) | Self::Text(s) => f.write_str(s),
        }
    }
}

/// Field schema: which field names are booleans and which are lists.
#[derive(Debug, Clone)]
pub struct Normalizer {
    boolean: HashSet<String>,
    list: HashSet<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(
            [fields::FORECAST_BULLETIN, fields::CLIMA_BULLETIN],
            [fields::CITIES],
        )
    }
}

impl Normalizer {
    pub fn new<B, L>(boolean: B, list: L) -> Self
    where
        B: IntoIterator,
        B::Item: Into<String>,
        L: IntoIterator,
        L::Item: Into<String>,
    {
        Self {
            boolean: boolean.into_iter().map(Into::into).collect(),
            list: list.into_iter().map(Into::into).collect(),
        }
    }

    pub fn kind(&self, field: &str) -> FieldKind {
        if self.boolean.contains(field) {
            FieldKind::Boolean
        } else if self.list.contains(field) {
            FieldKind::List
        } else {
            FieldKind::Text
        }
    }

    /// Normalize `raw` as the named field. `None` is treated like null.
    pub fn normalize(&self, field: &str, raw: Option<&Value>) -> NormalizedValue {
        normalize_as(self.kind(field), raw.unwrap_or(&Value::Null))
    }
}

/// Normalize a value under an explicit kind.
pub fn normalize_as(kind: FieldKind, raw: &Value) -> NormalizedValue {
    match kind {
        FieldKind::Boolean => boolean(raw),
        FieldKind::List => NormalizedValue::Text(list(raw)),
        FieldKind::Text => NormalizedValue::Text(stringify(raw).trim().to_owned()),
    }
}

fn boolean(raw: &Value) -> NormalizedValue {
    match raw {
        Value::Bool(b) => NormalizedValue::Bool(*b),
        Value::Number(n) => NormalizedValue::Bool(n.as_i64() == Some(1)),
        Value::String(s) => {
            let lowered = s.trim().to_lowercase();
            match lowered.as_str() {
                "1" | "true" | "yes" => NormalizedValue::Bool(true),
                "0" | "false" | "no" | "" => NormalizedValue::Bool(false),
                _ => NormalizedValue::Unrecognized(lowered),
            }
        }
        // Null and anything structured read as "not opted in".
        _ => NormalizedValue::Bool(false),
    }
}

fn list(raw: &Value) -> String {
    match raw {
        Value::Array(items) => items
            .iter()
            .map(|item| stringify(item).trim().to_owned())
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR),
        other => stringify(other).trim().to_owned(),
    }
}

fn stringify(raw: &Value) -> String {
    match raw {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        structured => structured.to_string(),
    }
}
