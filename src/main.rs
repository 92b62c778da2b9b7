//! Confusion Report: binary entrypoint.
//! Reads a JSON record array (and optionally a mark list), computes the
//! matrix report with the loaded config and prints it as pretty JSON.
//!
//! Config precedence: file (`--config`, `$MATRIX_CONFIG_PATH` or
//! `config/matrix.toml`) → `MATRIX_*` env → command-line flags.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use confusion_report::config::{MatrixStrategy, NullStrategy, ReportConfig};
use confusion_report::engine::compute;
use confusion_report::ingest::marks::{load_marks_default, load_marks_from};
use confusion_report::ingest::records_from_json;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "confusion-report",
    version,
    about = "Confusion matrix, recall/precision and drill-down index for evaluation records",
    after_help = r#"
EXAMPLES:
  confusion-report data/records.json
  confusion-report data/records.json config/marks.toml --strategy sparse
  confusion-report data/records.json --min-value-filter -1 --debug
"#
)]
struct Cli {
    /// JSON array of report rows.
    records: PathBuf,

    /// Mark list (TOML `[[marks]]` or JSON array). Default: config/marks.{toml,json}.
    marks: Option<PathBuf>,

    /// Config file; overrides $MATRIX_CONFIG_PATH and config/matrix.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// full | sparse (legacy codes 1 | 2).
    #[arg(long)]
    strategy: Option<MatrixStrategy>,

    #[arg(long, allow_negative_numbers = true)]
    min_value_filter: Option<i64>,

    /// error | discard | default.
    #[arg(long)]
    null_strategy: Option<NullStrategy>,

    #[arg(long, allow_negative_numbers = true)]
    matrix_max: Option<i64>,

    /// Log every calculation step (target `matrix`).
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn load_config(&self) -> Result<ReportConfig> {
        let cfg = match &self.config {
            Some(p) => {
                let mut cfg = ReportConfig::from_file(p)?;
                cfg.apply_env_from(|k| std::env::var(k).ok());
                cfg
            }
            None => ReportConfig::load().context("loading matrix config")?,
        };
        Ok(self.apply(cfg))
    }

    /// Flags win over file and env values.
    fn apply(&self, mut cfg: ReportConfig) -> ReportConfig {
        if let Some(s) = self.strategy {
            cfg = cfg.with_strategy(s);
        }
        if let Some(min) = self.min_value_filter {
            cfg = cfg.with_min_value_filter(min);
        }
        if let Some(ns) = self.null_strategy {
            cfg = cfg.with_null_strategy(ns);
        }
        if let Some(max) = self.matrix_max {
            cfg = cfg.with_matrix_max(max);
        }
        if self.debug {
            cfg = cfg.with_debug(true);
        }
        cfg
    }
}

/// Default filter when `RUST_LOG` is unset; debug mode opens the `matrix` target.
fn default_filter(debug: bool) -> &'static str {
    if debug {
        "matrix=debug,warn"
    } else {
        "matrix=info,warn"
    }
}

/// Logs go to stderr so stdout stays valid JSON.
fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli, cfg: &ReportConfig) -> Result<()> {
    let raw = fs::read_to_string(&cli.records)
        .with_context(|| format!("reading records from {}", cli.records.display()))?;
    let records = records_from_json(&raw, &cfg.fields)
        .with_context(|| format!("parsing records from {}", cli.records.display()))?;
    info!(target: "matrix", count = records.len(), path = %cli.records.display(), "ingested report rows");

    let marks = match &cli.marks {
        Some(p) => load_marks_from(p)?,
        None => load_marks_default()?,
    };

    let report = compute(&records, &marks, cfg)?;
    info!(
        target: "matrix",
        records = records.len(),
        size = report.size,
        accuracy = report.statistics.accuracy,
        "report computed"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> ExitCode {
    // .env is optional; it only feeds MATRIX_* overrides.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Config decides the default log filter, so it is loaded before tracing.
    let cfg = match cli.load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(cfg.debug);

    match run(&cli, &cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(target: "matrix", error = ?e, "report failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{error::ErrorKind, CommandFactory};

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn help_is_not_taken_as_a_path() {
        let err = Cli::try_parse_from(["confusion-report", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        let err = Cli::try_parse_from(["confusion-report"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn flags_override_loaded_config() {
        let cli = Cli::try_parse_from([
            "confusion-report",
            "recs.json",
            "marks.toml",
            "--strategy",
            "2",
            "--min-value-filter",
            "-1",
            "--null-strategy",
            "discard",
            "--matrix-max",
            "9",
            "--debug",
        ])
        .unwrap();
        assert_eq!(cli.records, PathBuf::from("recs.json"));
        assert_eq!(cli.marks, Some(PathBuf::from("marks.toml")));

        let base = ReportConfig::default().with_matrix_max(3);
        let cfg = cli.apply(base);
        assert_eq!(cfg.strategy, MatrixStrategy::Sparse);
        assert_eq!(cfg.min_value_filter, -1);
        assert_eq!(cfg.null_strategy, NullStrategy::Discard);
        assert_eq!(cfg.matrix_max, Some(9));
        assert!(cfg.debug);
    }

    #[test]
    fn absent_flags_keep_loaded_values() {
        let cli = Cli::try_parse_from(["confusion-report", "recs.json"]).unwrap();
        let base = ReportConfig::default()
            .with_strategy(MatrixStrategy::Sparse)
            .with_debug(true);
        assert_eq!(cli.apply(base.clone()), base);
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        assert!(Cli::try_parse_from(["confusion-report", "r.json", "--strategy", "diag"]).is_err());
    }

    #[test]
    fn debug_config_opens_matrix_debug_events() {
        assert_eq!(default_filter(true), "matrix=debug,warn");
        assert_eq!(default_filter(false), "matrix=info,warn");
        assert!(EnvFilter::try_new(default_filter(true)).is_ok());
    }
}
