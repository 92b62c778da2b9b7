// src/config/mod.rs
//! Report configuration: TOML file + env overrides.

pub mod report;

pub use report::{MatrixStrategy, NullStrategy, ReportConfig};
