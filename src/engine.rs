//! # Matrix Engine
//! Pure, testable orchestration: records → normalize → display values →
//! matrix → statistics → labels. No I/O; every call builds its own report.
//!
//! `matrix_max` (when not configured) and labels look at *all* input records,
//! not only those that survive filtering.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::ReportConfig;
use crate::debug::CalcLog;
use crate::domain::{observed_max, select_domain};
use crate::error::{ReportError, ReportResult};
use crate::ingest::types::Record;
use crate::labels::{resolve_label_logged, MarkEntry};
use crate::matrix::{build_matrix, cells_as_seq, CellKey};
use crate::normalize::normalize;
use crate::stats::{compute_statistics, ClassExtremes, Statistics};

/// Where the records went.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub original_count: usize,
    /// Survived the null policy.
    pub valid_count: usize,
    /// Discarded by the null policy.
    pub invalid_count: usize,
    /// Kept after coercing a bad field to 0.
    pub defaulted_count: usize,
    pub below_threshold_count: usize,
    /// Handed to the matrix builder.
    pub filtered_count: usize,
    pub tabulated_count: usize,
    pub out_of_domain_count: usize,
    pub wrong_count: u64,
    pub matrix_max: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixReport {
    pub display_values: Vec<i64>,
    pub size: usize,
    pub matrix: Vec<Vec<u64>>,
    #[serde(serialize_with = "cells_as_seq")]
    pub cells: BTreeMap<CellKey, Vec<usize>>,
    pub rows: BTreeMap<i64, Vec<usize>>,
    pub cols: BTreeMap<i64, Vec<usize>>,
    pub statistics: Statistics,
    pub summary: Summary,
    /// One label per display value, in axis order.
    pub labels: Vec<String>,
}

fn positions<'s, 'r, P>(
    idx: &'s [usize],
    records: &'r [Record<P>],
) -> impl Iterator<Item = &'r Record<P>> + 's
where
    'r: 's,
{
    idx.iter().filter_map(move |&i| records.get(i))
}

impl MatrixReport {
    pub fn index_of(&self, value: i64) -> Option<usize> {
        self.display_values.iter().position(|v| *v == value)
    }

    pub fn label_for(&self, value: i64) -> Option<&str> {
        self.index_of(value)
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }

    /// Positions of records tabulated at `(actual, predicted)`.
    pub fn cell_records(&self, actual: i64, predicted: i64) -> &[usize] {
        self.cells
            .get(&CellKey::new(actual, predicted))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn row_records(&self, actual: i64) -> &[usize] {
        self.rows.get(&actual).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn col_records(&self, predicted: i64) -> &[usize] {
        self.cols.get(&predicted).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve a cell's positions against the slice the report was computed from.
    pub fn cell_iter<'s, 'r, P>(
        &'s self,
        records: &'r [Record<P>],
        actual: i64,
        predicted: i64,
    ) -> impl Iterator<Item = &'r Record<P>> + 's
    where
        'r: 's,
    {
        positions(self.cell_records(actual, predicted), records)
    }

    pub fn row_iter<'s, 'r, P>(
        &'s self,
        records: &'r [Record<P>],
        actual: i64,
    ) -> impl Iterator<Item = &'r Record<P>> + 's
    where
        'r: 's,
    {
        positions(self.row_records(actual), records)
    }

    pub fn col_iter<'s, 'r, P>(
        &'s self,
        records: &'r [Record<P>],
        predicted: i64,
    ) -> impl Iterator<Item = &'r Record<P>> + 's
    where
        'r: 's,
    {
        positions(self.col_records(predicted), records)
    }

    pub fn extremes(&self) -> ClassExtremes {
        self.statistics.extremes(&self.display_values)
    }
}

/// Build the full report for `records`.
pub fn compute<P>(
    records: &[Record<P>],
    marks: &[MarkEntry],
    cfg: &ReportConfig,
) -> ReportResult<MatrixReport> {
    if records.is_empty() {
        return Err(ReportError::validation("record list is empty"));
    }
    let matrix_max = cfg.matrix_max.unwrap_or_else(|| observed_max(records));
    compute_subset(records.iter().enumerate(), records, marks, cfg, matrix_max)
}

/// One report per group key. Every group shares the same `matrix_max` (the
/// configured one, else the maximum over all records) so full-strategy axes
/// line up across groups. Positions in each report index into `records`.
pub fn compute_grouped<P, K, F>(
    records: &[Record<P>],
    marks: &[MarkEntry],
    cfg: &ReportConfig,
    key: F,
) -> ReportResult<BTreeMap<K, MatrixReport>>
where
    K: Ord,
    F: Fn(&Record<P>) -> K,
{
    if records.is_empty() {
        return Err(ReportError::validation("record list is empty"));
    }
    let matrix_max = cfg.matrix_max.unwrap_or_else(|| observed_max(records));

    let mut groups: BTreeMap<K, Vec<usize>> = BTreeMap::new();
    for (i, rec) in records.iter().enumerate() {
        groups.entry(key(rec)).or_default().push(i);
    }

    groups
        .into_iter()
        .map(|(k, idx)| {
            let subset = idx.iter().map(move |&i| (i, &records[i]));
            compute_subset(subset, records, marks, cfg, matrix_max).map(|r| (k, r))
        })
        .collect()
}

fn compute_subset<'a, P: 'a, I>(
    subset: I,
    all: &'a [Record<P>],
    marks: &[MarkEntry],
    cfg: &ReportConfig,
    matrix_max: i64,
) -> ReportResult<MatrixReport>
where
    I: IntoIterator<Item = (usize, &'a Record<P>)>,
{
    let log = CalcLog::new(cfg.debug);
    let subset = subset.into_iter();
    log.input(
        subset.size_hint().0,
        cfg.strategy,
        cfg.null_strategy,
        cfg.min_value_filter,
    );

    // 1) Parse, null policy, threshold
    let norm = normalize(subset, cfg.null_strategy, cfg.min_value_filter, &log)?;

    // 2) Axis
    let display_values = select_domain(
        &norm.kept,
        matrix_max,
        cfg.strategy,
        cfg.min_value_filter,
        cfg.axis_limit,
    )?;
    log.domain(cfg.strategy, matrix_max, &display_values);

    // 3) Tabulate
    let table = build_matrix(&norm.kept, &display_values, &log);

    // 4) Metrics
    let statistics = compute_statistics(&table.matrix, &table.display_values);
    log.statistics(&statistics);

    // 5) Labels
    let labels = table
        .display_values
        .iter()
        .map(|v| resolve_label_logged(*v, marks, all, &log))
        .collect();

    let summary = Summary {
        original_count: norm.seen,
        valid_count: norm.valid,
        invalid_count: norm.discarded,
        defaulted_count: norm.defaulted,
        below_threshold_count: norm.below_threshold,
        filtered_count: norm.kept.len(),
        tabulated_count: table.tabulated,
        out_of_domain_count: table.out_of_domain,
        wrong_count: statistics.wrong_count,
        matrix_max,
    };

    Ok(MatrixReport {
        size: table.display_values.len(),
        display_values: table.display_values,
        matrix: table.matrix,
        cells: table.cells,
        rows: table.rows,
        cols: table.cols,
        statistics,
        summary,
        labels,
    })
}
