//! Error type for the matrix engine.
//!
//! Degenerate inputs (empty axis, zero totals) are not errors; the engine
//! returns zeroed statistics for those.

use thiserror::Error;

use crate::ingest::types::RawValue;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    /// Input is not a non-empty sequence of record-like objects.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A record failed numeric parsing under the `error` null strategy.
    /// `index` is 1-based.
    #[error("record {index} has a missing or non-numeric value: actual={actual}, predicted={predicted}")]
    Parse {
        index: usize,
        actual: RawValue,
        predicted: RawValue,
    },

    /// The axis would exceed the configured size limit.
    #[error("value domain of {size} entries exceeds the axis limit of {limit}")]
    DomainTooLarge { size: usize, limit: usize },

    #[error("malformed JSON input: {0}")]
    Json(String),
}

impl ReportError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
