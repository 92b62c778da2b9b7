//! # Value-Domain Selector
//! Picks the ordered axis values shared by rows and columns.

use std::collections::BTreeSet;

use crate::config::MatrixStrategy;
use crate::error::{ReportError, ReportResult};
use crate::ingest::types::Record;
use crate::normalize::{parse_lenient, NormalizedRecord};

/// Largest parsed actual/predicted value across `records`, floored at 0.
/// Unparsable fields are ignored; the null policy does not apply here.
pub fn observed_max<'a, P: 'a>(records: impl IntoIterator<Item = &'a Record<P>>) -> i64 {
    records
        .into_iter()
        .flat_map(|r| [parse_lenient(&r.actual), parse_lenient(&r.predicted)])
        .filter_map(|p| p.value())
        .fold(0, i64::max)
}

/// First axis value of the full strategy.
pub fn full_start(min_value_filter: i64) -> i64 {
    min_value_filter.saturating_add(1).max(0)
}

/// Build the display values. Fails only when the axis would exceed `axis_limit`.
pub fn select_domain(
    filtered: &[NormalizedRecord],
    matrix_max: i64,
    strategy: MatrixStrategy,
    min_value_filter: i64,
    axis_limit: usize,
) -> ReportResult<Vec<i64>> {
    match strategy {
        MatrixStrategy::Full => {
            let start = full_start(min_value_filter);
            if matrix_max < start {
                return Ok(Vec::new());
            }
            // i128 so a huge configured max can't overflow the length
            let len = (matrix_max as i128) - (start as i128) + 1;
            if len > axis_limit as i128 {
                return Err(ReportError::DomainTooLarge {
                    size: usize::try_from(len).unwrap_or(usize::MAX),
                    limit: axis_limit,
                });
            }
            Ok((start..=matrix_max).collect())
        }
        MatrixStrategy::Sparse => {
            let set: BTreeSet<i64> = filtered
                .iter()
                .flat_map(|r| [r.actual, r.predicted])
                .filter(|v| *v > min_value_filter)
                .collect();
            if set.len() > axis_limit {
                return Err(ReportError::DomainTooLarge {
                    size: set.len(),
                    limit: axis_limit,
                });
            }
            Ok(set.into_iter().collect())
        }
    }
}
