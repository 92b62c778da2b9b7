//! # Metrics Engine
//! Row/column sums, per-class recall and precision, accuracy, and the
//! aggregate recall/precision that leave class 0 out when it is on the axis.
//!
//! All rates are percentages in `[0, 100]`, unrounded. A zero denominator
//! yields 0, never NaN.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub row_sum: Vec<u64>,
    pub col_sum: Vec<u64>,
    pub diagonal: Vec<u64>,
    pub recall: Vec<f64>,
    pub precision: Vec<f64>,
    pub total_count: u64,
    pub correct_count: u64,
    pub wrong_count: u64,
    pub accuracy: f64,
    pub total_recall: f64,
    pub total_precision: f64,
    pub total_recall_numerator: u64,
    pub total_recall_denominator: u64,
    pub total_precision_numerator: u64,
    pub total_precision_denominator: u64,
    pub has_zero_value: bool,
    pub zero_index: Option<usize>,
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64 * 100.0
    }
}

/// Compute statistics for a square `matrix` laid out over `display_values`.
/// Missing cells in ragged rows count as 0.
pub fn compute_statistics(matrix: &[Vec<u64>], display_values: &[i64]) -> Statistics {
    let n = display_values.len();
    let cell = |r: usize, c: usize| -> u64 {
        matrix
            .get(r)
            .and_then(|row| row.get(c))
            .copied()
            .unwrap_or(0)
    };

    let row_sum: Vec<u64> = (0..n).map(|r| (0..n).map(|c| cell(r, c)).sum()).collect();
    let col_sum: Vec<u64> = (0..n).map(|c| (0..n).map(|r| cell(r, c)).sum()).collect();
    let diagonal: Vec<u64> = (0..n).map(|i| cell(i, i)).collect();

    let recall = diagonal
        .iter()
        .zip(&row_sum)
        .map(|(d, s)| ratio(*d, *s))
        .collect();
    let precision = diagonal
        .iter()
        .zip(&col_sum)
        .map(|(d, s)| ratio(*d, *s))
        .collect();

    let total_count: u64 = row_sum.iter().sum();
    let correct_count: u64 = diagonal.iter().sum();
    let accuracy = ratio(correct_count, total_count);

    let zero_index = display_values.iter().position(|v| *v == 0);
    let (rn, rd, pn, pd) = match zero_index {
        Some(z) => (
            correct_count - diagonal[z],
            total_count - row_sum[z],
            correct_count - diagonal[z],
            total_count - col_sum[z],
        ),
        None => (correct_count, total_count, correct_count, total_count),
    };

    Statistics {
        recall,
        precision,
        total_count,
        correct_count,
        wrong_count: total_count - correct_count,
        accuracy,
        total_recall: ratio(rn, rd),
        total_precision: ratio(pn, pd),
        total_recall_numerator: rn,
        total_recall_denominator: rd,
        total_precision_numerator: pn,
        total_precision_denominator: pd,
        has_zero_value: zero_index.is_some(),
        zero_index,
        row_sum,
        col_sum,
        diagonal,
    }
}

/// One class and its rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassRate {
    pub value: i64,
    pub rate: f64,
}

/// Best and worst classes by recall and precision.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassExtremes {
    pub best_recall: Option<ClassRate>,
    pub worst_recall: Option<ClassRate>,
    pub best_precision: Option<ClassRate>,
    pub worst_precision: Option<ClassRate>,
}

impl Statistics {
    /// Best picks the first maximum over all classes; worst the first minimum
    /// over classes with non-zero support (row sum for recall, column sum for
    /// precision).
    pub fn extremes(&self, display_values: &[i64]) -> ClassExtremes {
        ClassExtremes {
            best_recall: best(display_values, &self.recall),
            worst_recall: worst(display_values, &self.recall, &self.row_sum),
            best_precision: best(display_values, &self.precision),
            worst_precision: worst(display_values, &self.precision, &self.col_sum),
        }
    }
}

fn best(values: &[i64], rates: &[f64]) -> Option<ClassRate> {
    let mut out: Option<ClassRate> = None;
    for (value, rate) in values.iter().zip(rates) {
        if out.map_or(true, |b| *rate > b.rate) {
            out = Some(ClassRate {
                value: *value,
                rate: *rate,
            });
        }
    }
    out
}

fn worst(values: &[i64], rates: &[f64], support: &[u64]) -> Option<ClassRate> {
    let mut out: Option<ClassRate> = None;
    for ((value, rate), n) in values.iter().zip(rates).zip(support) {
        if *n == 0 {
            continue;
        }
        if out.map_or(true, |w| *rate < w.rate) {
            out = Some(ClassRate {
                value: *value,
                rate: *rate,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn zero_class_is_left_out_of_aggregates() {
        let m = vec![vec![5, 0, 0], vec![0, 8, 2], vec![0, 1, 9]];
        let s = compute_statistics(&m, &[0, 1, 2]);

        assert_eq!(s.total_count, 25);
        assert_eq!(s.correct_count, 22);
        assert_eq!(s.wrong_count, 3);
        assert!(approx(s.accuracy, 88.0));
        assert_eq!((s.total_recall_numerator, s.total_recall_denominator), (17, 20));
        assert_eq!(
            (s.total_precision_numerator, s.total_precision_denominator),
            (17, 20)
        );
        assert!(approx(s.total_recall, 85.0));
        assert!(approx(s.total_precision, 85.0));
        assert_eq!(s.zero_index, Some(0));
        assert!(s.has_zero_value);
    }

    #[test]
    fn without_zero_aggregates_equal_accuracy() {
        let m = vec![vec![1, 1], vec![0, 1]];
        let s = compute_statistics(&m, &[1, 2]);
        assert_eq!(s.recall, vec![50.0, 100.0]);
        assert_eq!(s.precision, vec![100.0, 50.0]);
        assert!(approx(s.accuracy, 200.0 / 3.0));
        assert_eq!(s.total_recall, s.accuracy);
        assert_eq!(s.total_precision, s.accuracy);
        assert_eq!(s.zero_index, None);
    }

    #[test]
    fn empty_rows_and_columns_rate_zero() {
        let m = vec![vec![0, 0], vec![3, 0]];
        let s = compute_statistics(&m, &[1, 2]);
        assert_eq!(s.recall, vec![0.0, 0.0]);
        assert_eq!(s.precision, vec![0.0, 0.0]);
        assert_eq!(s.accuracy, 0.0);
    }

    #[test]
    fn only_zero_class_gives_zero_aggregates() {
        let s = compute_statistics(&[vec![4]], &[0]);
        assert!(approx(s.accuracy, 100.0));
        assert_eq!(s.total_recall_denominator, 0);
        assert_eq!(s.total_recall, 0.0);
        assert_eq!(s.total_precision, 0.0);
    }

    #[test]
    fn empty_matrix_is_all_zero() {
        let s = compute_statistics(&[], &[]);
        assert_eq!(s.total_count, 0);
        assert_eq!(s.accuracy, 0.0);
        assert_eq!(s.total_recall, 0.0);
        assert!(s.recall.is_empty());
    }

    #[test]
    fn extremes_skip_unsupported_classes_for_worst() {
        // class 3 has no actual records and no predictions
        let m = vec![vec![1, 1, 0], vec![0, 2, 0], vec![0, 0, 0]];
        let v = [1, 2, 3];
        let s = compute_statistics(&m, &v);
        let e = s.extremes(&v);

        assert_eq!(e.best_recall.map(|c| c.value), Some(2));
        assert_eq!(e.worst_recall.map(|c| c.value), Some(1));
        assert_eq!(e.best_precision.map(|c| c.value), Some(1));
        assert_eq!(e.worst_precision.map(|c| c.value), Some(2));
        assert_eq!(ClassExtremes::default().best_recall, None);
    }
}
