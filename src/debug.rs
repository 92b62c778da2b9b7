//! Per-call calculation log.
//!
//! Diagnostics for one `compute` call are emitted only when that call's
//! config sets `debug = true`; there is no process-wide switch. Events go
//! through `tracing` under the `matrix` target.

use tracing::debug;

use crate::config::{MatrixStrategy, NullStrategy};
use crate::stats::Statistics;

/// Per-record events are capped so large inputs don't flood the log.
const RECORD_EVENT_CAP: usize = 5;
const LIST_CAP: usize = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct CalcLog {
    enabled: bool,
}

impl CalcLog {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn input(
        &self,
        records: usize,
        strategy: MatrixStrategy,
        null_strategy: NullStrategy,
        min_value_filter: i64,
    ) {
        if !self.enabled {
            return;
        }
        debug!(
            target: "matrix",
            records, ?strategy, ?null_strategy, min_value_filter,
            "matrix computation started"
        );
    }

    /// `seen` is how many records were dropped before this one.
    pub fn dropped(&self, seen: usize, index: usize, reason: &'static str) {
        if !self.enabled || seen >= RECORD_EVENT_CAP {
            return;
        }
        debug!(target: "matrix", record = index + 1, reason, "record excluded");
    }

    pub fn domain(&self, strategy: MatrixStrategy, matrix_max: i64, values: &[i64]) {
        if !self.enabled {
            return;
        }
        debug!(
            target: "matrix",
            ?strategy, matrix_max, size = values.len(),
            values = ?truncate_vec(values, LIST_CAP),
            "display values selected"
        );
    }

    pub fn tabulated(&self, seen: usize, index: usize, actual: i64, predicted: i64) {
        if !self.enabled || seen >= RECORD_EVENT_CAP {
            return;
        }
        debug!(target: "matrix", record = index + 1, actual, predicted, "cell incremented");
    }

    pub fn matrix_built(&self, tabulated: usize, out_of_domain: usize) {
        if !self.enabled {
            return;
        }
        debug!(target: "matrix", tabulated, out_of_domain, "matrix built");
    }

    pub fn statistics(&self, stats: &Statistics) {
        if !self.enabled {
            return;
        }
        debug!(
            target: "matrix",
            total = stats.total_count,
            correct = stats.correct_count,
            accuracy = stats.accuracy,
            total_recall = stats.total_recall,
            total_precision = stats.total_precision,
            zero_index = ?stats.zero_index,
            "statistics computed"
        );
    }

    pub fn label(&self, value: i64, source: &'static str, label: &str) {
        if !self.enabled {
            return;
        }
        debug!(target: "matrix", value, source, label, "label resolved");
    }
}

pub(crate) fn truncate_vec<T: ToString>(v: &[T], max: usize) -> Vec<String> {
    v.iter().take(max).map(|x| x.to_string()).collect()
}
