// src/config/report.rs
use anyhow::{anyhow, Context};
use serde::{Deserialize, Deserializer, Serialize};
use std::{env, fmt, fs, path::Path, path::PathBuf, str::FromStr};
use tracing::warn;

use crate::ingest::FieldMap;

pub const DEFAULT_CONFIG_PATH: &str = "config/matrix.toml";
pub const DEFAULT_AXIS_LIMIT: usize = 2048;

pub const ENV_CONFIG_PATH: &str = "MATRIX_CONFIG_PATH";
pub const ENV_STRATEGY: &str = "MATRIX_STRATEGY";
pub const ENV_MIN_VALUE_FILTER: &str = "MATRIX_MIN_VALUE_FILTER";
pub const ENV_NULL_STRATEGY: &str = "MATRIX_NULL_STRATEGY";
pub const ENV_MATRIX_MAX: &str = "MATRIX_MAX";
pub const ENV_DEBUG: &str = "MATRIX_DEBUG";

/// How the row/column axis is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixStrategy {
    /// Contiguous range up to the observed or configured maximum.
    #[default]
    Full,
    /// Only values observed in the filtered records.
    Sparse,
}

impl FromStr for MatrixStrategy {
    type Err = anyhow::Error;

    /// Accepts the names and the legacy codes "1" (full) / "2" (sparse).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" | "1" => Ok(Self::Full),
            "sparse" | "2" => Ok(Self::Sparse),
            other => Err(anyhow!("unknown matrix strategy `{other}`")),
        }
    }
}

impl fmt::Display for MatrixStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Full => "full",
            Self::Sparse => "sparse",
        })
    }
}

/// What to do with records whose actual/predicted value is missing or not numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NullStrategy {
    /// Abort the whole computation.
    Error,
    /// Drop the record.
    Discard,
    /// Coerce the bad field(s) to 0 and keep the record.
    #[default]
    Default,
}

impl FromStr for NullStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "discard" => Ok(Self::Discard),
            "default" | "zero" => Ok(Self::Default),
            other => Err(anyhow!("unknown null strategy `{other}`")),
        }
    }
}

impl fmt::Display for NullStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Discard => "discard",
            Self::Default => "default",
        })
    }
}

macro_rules! deserialize_from_str {
    ($ty:ty) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let s = String::deserialize(d)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}
deserialize_from_str!(MatrixStrategy);
deserialize_from_str!(NullStrategy);

fn default_axis_limit() -> usize {
    DEFAULT_AXIS_LIMIT
}

/// Configuration for one matrix computation.
///
/// TOML shape (all keys optional):
/// ```toml
/// strategy = "sparse"
/// min_value_filter = -1
/// null_strategy = "discard"
/// matrix_max = 15
/// debug = true
///
/// [fields]
/// actual = "acturalValue"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default, alias = "matrixStrategy")]
    pub strategy: MatrixStrategy,
    #[serde(default, alias = "minValueFilter")]
    pub min_value_filter: i64,
    #[serde(default, alias = "nullStrategy")]
    pub null_strategy: NullStrategy,
    /// Upper bound for the full strategy; observed maximum when unset.
    #[serde(default, alias = "matrixMax")]
    pub matrix_max: Option<i64>,
    #[serde(default = "default_axis_limit", alias = "axisLimit")]
    pub axis_limit: usize,
    /// Emit per-call calculation diagnostics.
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub fields: FieldMap,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            strategy: MatrixStrategy::default(),
            min_value_filter: 0,
            null_strategy: NullStrategy::default(),
            matrix_max: None,
            axis_limit: DEFAULT_AXIS_LIMIT,
            debug: false,
            fields: FieldMap::default(),
        }
    }
}

impl ReportConfig {
    pub fn with_strategy(mut self, strategy: MatrixStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_min_value_filter(mut self, min: i64) -> Self {
        self.min_value_filter = min;
        self
    }

    pub fn with_null_strategy(mut self, ns: NullStrategy) -> Self {
        self.null_strategy = ns;
        self
    }

    pub fn with_matrix_max(mut self, max: i64) -> Self {
        self.matrix_max = Some(max);
        self
    }

    pub fn with_debug(mut self, on: bool) -> Self {
        self.debug = on;
        self
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let mut cfg: ReportConfig = toml::from_str(s)?;
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading matrix config from {}", path.display()))?;
        Self::from_toml_str(&data)
            .with_context(|| format!("parsing matrix config at {}", path.display()))
    }

    /// Load from `$MATRIX_CONFIG_PATH` or `config/matrix.toml`, then apply env
    /// overrides. A missing default file yields defaults; a missing explicit
    /// path is an error.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    anyhow::bail!("MATRIX_CONFIG_PATH points to non-existent path");
                }
                Self::from_file(&pb)?
            }
            Err(_) => {
                let pb = PathBuf::from(DEFAULT_CONFIG_PATH);
                if pb.exists() {
                    Self::from_file(&pb)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env_from(|k| env::var(k).ok());
        Ok(cfg)
    }

    /// Apply overrides from a key lookup (the process environment in `load`).
    /// Unparsable values are ignored with a warning.
    pub fn apply_env_from<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = get(ENV_STRATEGY) {
            match raw.parse() {
                Ok(s) => self.strategy = s,
                Err(e) => warn!(target: "matrix", key = ENV_STRATEGY, error = %e, "ignoring override"),
            }
        }
        if let Some(raw) = get(ENV_NULL_STRATEGY) {
            match raw.parse() {
                Ok(s) => self.null_strategy = s,
                Err(e) => warn!(target: "matrix", key = ENV_NULL_STRATEGY, error = %e, "ignoring override"),
            }
        }
        if let Some(raw) = get(ENV_MIN_VALUE_FILTER) {
            match raw.trim().parse::<i64>() {
                Ok(v) => self.min_value_filter = v,
                Err(e) => warn!(target: "matrix", key = ENV_MIN_VALUE_FILTER, error = %e, "ignoring override"),
            }
        }
        if let Some(raw) = get(ENV_MATRIX_MAX) {
            match raw.trim().parse::<i64>() {
                Ok(v) => self.matrix_max = Some(v),
                Err(e) => warn!(target: "matrix", key = ENV_MATRIX_MAX, error = %e, "ignoring override"),
            }
        }
        if let Some(raw) = get(ENV_DEBUG) {
            self.debug = matches!(raw.trim(), "1" | "true" | "TRUE" | "yes");
        }
        self.sanitize();
    }

    fn sanitize(&mut self) {
        if self.axis_limit == 0 {
            self.axis_limit = DEFAULT_AXIS_LIMIT;
        }
    }
}
