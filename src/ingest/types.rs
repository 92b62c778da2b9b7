// src/ingest/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw scalar field as it arrives from a report row.
///
/// Deserializes straight from any JSON scalar. Arrays and objects are kept as
/// their JSON text so they surface in error messages but never parse.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawValue {
    pub fn from_json(v: &serde_json::Value) -> Self {
        use serde_json::Value;
        match v {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map(Self::Float).unwrap_or(Self::Null),
            },
            Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text suitable for a row label; `None` for null and empty text.
    pub fn as_label(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Text(s) if s.trim().is_empty() => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for RawValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for RawValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

/// One evaluation sample.
///
/// `payload` is carried through for drill-down display only; nothing in the
/// engine reads it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record<P = serde_json::Value> {
    pub actual: RawValue,
    pub predicted: RawValue,
    pub description: RawValue,
    pub payload: P,
}

impl Record<serde_json::Value> {
    /// Record without description or payload.
    pub fn new(actual: impl Into<RawValue>, predicted: impl Into<RawValue>) -> Self {
        Self {
            actual: actual.into(),
            predicted: predicted.into(),
            description: RawValue::Null,
            payload: serde_json::Value::Null,
        }
    }
}

impl<P> Record<P> {
    pub fn described(mut self, description: impl Into<RawValue>) -> Self {
        self.description = description.into();
        self
    }

    /// Swap the payload, keeping the evaluated fields.
    pub fn with_payload<Q>(self, payload: Q) -> Record<Q> {
        Record {
            actual: self.actual,
            predicted: self.predicted,
            description: self.description,
            payload,
        }
    }
}
