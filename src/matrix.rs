//! # Matrix Builder
//! Cross-tabulates normalized records over the display values and keeps
//! back-references (record positions) per cell, row and column.

use std::collections::{BTreeMap, HashMap};

use serde::{Serialize, Serializer};

use crate::debug::CalcLog;
use crate::normalize::NormalizedRecord;

/// `(actual, predicted)` coordinate of one cell, by axis value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CellKey {
    pub actual: i64,
    pub predicted: i64,
}

impl CellKey {
    pub fn new(actual: i64, predicted: i64) -> Self {
        Self { actual, predicted }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixTable {
    pub display_values: Vec<i64>,
    /// `matrix[row][col]`, rows are actual values.
    pub matrix: Vec<Vec<u64>>,
    #[serde(serialize_with = "cells_as_seq")]
    pub cells: BTreeMap<CellKey, Vec<usize>>,
    pub rows: BTreeMap<i64, Vec<usize>>,
    pub cols: BTreeMap<i64, Vec<usize>>,
    pub tabulated: usize,
    pub out_of_domain: usize,
}

#[derive(Serialize)]
struct CellEntry<'a> {
    actual: i64,
    predicted: i64,
    records: &'a [usize],
}

// JSON object keys must be strings, so cells go out as a list.
pub(crate) fn cells_as_seq<S: Serializer>(
    cells: &BTreeMap<CellKey, Vec<usize>>,
    s: S,
) -> Result<S::Ok, S::Error> {
    s.collect_seq(cells.iter().map(|(k, v)| CellEntry {
        actual: k.actual,
        predicted: k.predicted,
        records: v,
    }))
}

/// Tabulate `filtered` over `display_values`. Records with either value off
/// the axis are counted in `out_of_domain` and otherwise ignored.
pub fn build_matrix(
    filtered: &[NormalizedRecord],
    display_values: &[i64],
    log: &CalcLog,
) -> MatrixTable {
    let size = display_values.len();
    let index: HashMap<i64, usize> = display_values
        .iter()
        .enumerate()
        .map(|(i, v)| (*v, i))
        .collect();

    let mut table = MatrixTable {
        display_values: display_values.to_vec(),
        matrix: vec![vec![0u64; size]; size],
        ..MatrixTable::default()
    };

    for rec in filtered {
        let (Some(&r), Some(&c)) = (index.get(&rec.actual), index.get(&rec.predicted)) else {
            table.out_of_domain += 1;
            continue;
        };
        table.matrix[r][c] += 1;
        table
            .cells
            .entry(CellKey::new(rec.actual, rec.predicted))
            .or_default()
            .push(rec.index);
        table.rows.entry(rec.actual).or_default().push(rec.index);
        table.cols.entry(rec.predicted).or_default().push(rec.index);
        log.tabulated(table.tabulated, rec.index, rec.actual, rec.predicted);
        table.tabulated += 1;
    }

    log.matrix_built(table.tabulated, table.out_of_domain);
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nr(index: usize, actual: i64, predicted: i64) -> NormalizedRecord {
        NormalizedRecord {
            index,
            actual,
            predicted,
            defaulted: false,
        }
    }

    #[test]
    fn counts_and_back_references_line_up() {
        let f = [nr(0, 1, 1), nr(1, 1, 2), nr(2, 2, 2), nr(4, 1, 2)];
        let t = build_matrix(&f, &[1, 2], &CalcLog::default());

        assert_eq!(t.matrix, vec![vec![1, 2], vec![0, 1]]);
        assert_eq!(t.tabulated, 4);
        assert_eq!(t.cells[&CellKey::new(1, 2)], vec![1, 4]);
        assert_eq!(t.rows[&1], vec![0, 1, 4]);
        assert_eq!(t.cols[&2], vec![1, 2, 4]);
        assert!(!t.cells.contains_key(&CellKey::new(2, 1)));
    }

    #[test]
    fn off_axis_records_are_skipped() {
        let f = [nr(0, 1, 1), nr(1, 1, 9), nr(2, 7, 1)];
        let t = build_matrix(&f, &[1], &CalcLog::default());
        assert_eq!(t.matrix, vec![vec![1]]);
        assert_eq!(t.out_of_domain, 2);
        assert_eq!(t.rows[&1], vec![0]);
    }

    #[test]
    fn empty_axis_gives_empty_matrix() {
        let t = build_matrix(&[nr(0, 1, 1)], &[], &CalcLog::default());
        assert!(t.matrix.is_empty());
        assert_eq!(t.out_of_domain, 1);
    }

    #[test]
    fn cells_serialize_as_list() {
        let t = build_matrix(&[nr(3, 2, 1)], &[1, 2], &CalcLog::default());
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(
            v["cells"],
            serde_json::json!([{"actual": 2, "predicted": 1, "records": [3]}])
        );
        assert_eq!(v["rows"]["2"], serde_json::json!([3]));
        assert_eq!(v["outOfDomain"], serde_json::json!(0));
    }
}
