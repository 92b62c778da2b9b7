// src/ingest/mod.rs
//! Turns raw report rows (JSON objects) into typed [`Record`]s.
//!
//! Which keys hold the actual value, the predicted value and the description is
//! configurable through [`FieldMap`]. The whole row is kept as the payload.
//!
//! Ingest is silent; calculation diagnostics belong to the per-call log in
//! `debug`, and the binary logs the row count itself.

pub mod marks;
pub mod types;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ReportError, ReportResult};
use crate::ingest::types::{RawValue, Record};

pub const DEFAULT_ACTUAL_FIELD: &str = "actualValue";
pub const DEFAULT_PREDICTED_FIELD: &str = "predictedValue";
pub const DEFAULT_DESCRIPTION_FIELD: &str = "descValue";

fn default_actual_field() -> String {
    DEFAULT_ACTUAL_FIELD.to_string()
}
fn default_predicted_field() -> String {
    DEFAULT_PREDICTED_FIELD.to_string()
}
fn default_description_field() -> String {
    DEFAULT_DESCRIPTION_FIELD.to_string()
}

/// Row keys for the three evaluated fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    #[serde(default = "default_actual_field")]
    pub actual: String,
    #[serde(default = "default_predicted_field")]
    pub predicted: String,
    #[serde(default = "default_description_field")]
    pub description: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            actual: default_actual_field(),
            predicted: default_predicted_field(),
            description: default_description_field(),
        }
    }
}

/// Parse a JSON document that must be a non-empty array of objects.
pub fn records_from_json(input: &str, fields: &FieldMap) -> ReportResult<Vec<Record>> {
    let doc: Value = serde_json::from_str(input)?;
    match doc {
        Value::Array(rows) => records_from_values(rows, fields),
        _ => Err(ReportError::validation("records must be a JSON array")),
    }
}

/// Map already-parsed rows into records. Missing keys become null fields.
pub fn records_from_values(rows: Vec<Value>, fields: &FieldMap) -> ReportResult<Vec<Record>> {
    if rows.is_empty() {
        return Err(ReportError::validation("record list is empty"));
    }

    let mut out = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        let Value::Object(ref obj) = row else {
            return Err(ReportError::validation(format!(
                "record {} is not an object",
                i + 1
            )));
        };
        let field = |key: &str| obj.get(key).map(RawValue::from_json).unwrap_or_default();
        let actual = field(&fields.actual);
        let predicted = field(&fields.predicted);
        let description = field(&fields.description);
        out.push(Record {
            actual,
            predicted,
            description,
            payload: row,
        });
    }

    Ok(out)
}
