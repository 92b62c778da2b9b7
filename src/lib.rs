// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod debug;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod labels;
pub mod matrix;
pub mod normalize;
pub mod stats;

// ---- Re-exports for stable public API ----
pub use crate::config::{MatrixStrategy, NullStrategy, ReportConfig};
pub use crate::engine::{compute, compute_grouped, MatrixReport, Summary};
pub use crate::error::{ReportError, ReportResult};
pub use crate::ingest::types::{RawValue, Record};
pub use crate::ingest::{records_from_json, records_from_values, FieldMap};
pub use crate::labels::{marks_from_json, resolve_label, MarkEntry};
pub use crate::stats::{ClassExtremes, ClassRate, Statistics};
