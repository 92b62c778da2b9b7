//! # Input Normalizer
//! One lenient parse step for actual/predicted fields, the null policy, and
//! the minimum-value filter. Later stages only ever see [`NormalizedRecord`]s.
//!
//! Order per record: parse both fields → null policy → `min_value_filter`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::NullStrategy;
use crate::debug::CalcLog;
use crate::error::{ReportError, ReportResult};
use crate::ingest::types::{RawValue, Record};

static LEADING_INT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d+").expect("leading-int regex"));

/// Outcome of parsing one raw field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parsed {
    Value(i64),
    /// Null or blank text.
    Missing,
    /// Present but not numeric (or out of `i64` range).
    Unparsable,
}

impl Parsed {
    pub fn value(self) -> Option<i64> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Lenient integer parse: leading signed digit run of trimmed text, truncated
/// finite floats, integers as-is.
pub fn parse_lenient(raw: &RawValue) -> Parsed {
    match raw {
        RawValue::Null => Parsed::Missing,
        RawValue::Bool(_) => Parsed::Unparsable,
        RawValue::Int(i) => Parsed::Value(*i),
        RawValue::Float(f) => {
            let t = f.trunc();
            if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
                Parsed::Value(t as i64)
            } else {
                Parsed::Unparsable
            }
        }
        RawValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Parsed::Missing;
            }
            match LEADING_INT.find(s) {
                Some(m) => m
                    .as_str()
                    .parse::<i64>()
                    .map(Parsed::Value)
                    .unwrap_or(Parsed::Unparsable),
                None => Parsed::Unparsable,
            }
        }
    }
}

/// A record that survived normalization, with integer axis values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedRecord {
    /// 0-based position in the caller's record slice.
    pub index: usize,
    pub actual: i64,
    pub predicted: i64,
    /// At least one field was coerced to 0 under [`NullStrategy::Default`].
    pub defaulted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    pub kept: Vec<NormalizedRecord>,
    pub seen: usize,
    /// Survived the null policy (includes defaulted records).
    pub valid: usize,
    /// Dropped by the null policy.
    pub discarded: usize,
    pub defaulted: usize,
    /// Dropped by `min_value_filter`.
    pub below_threshold: usize,
}

/// Run the null policy and threshold filter over `(position, record)` pairs.
pub fn normalize<'a, P: 'a, I>(
    records: I,
    null_strategy: NullStrategy,
    min_value_filter: i64,
    log: &CalcLog,
) -> ReportResult<Normalized>
where
    I: IntoIterator<Item = (usize, &'a Record<P>)>,
{
    let mut out = Normalized::default();
    let mut dropped = 0usize;

    for (index, rec) in records {
        out.seen += 1;
        let a = parse_lenient(&rec.actual);
        let p = parse_lenient(&rec.predicted);

        let (actual, predicted, defaulted) = match (a, p) {
            (Parsed::Value(a), Parsed::Value(p)) => (a, p, false),
            _ => match null_strategy {
                NullStrategy::Error => {
                    return Err(ReportError::Parse {
                        index: index + 1,
                        actual: rec.actual.clone(),
                        predicted: rec.predicted.clone(),
                    });
                }
                NullStrategy::Discard => {
                    log.dropped(dropped, index, "missing or non-numeric value");
                    dropped += 1;
                    out.discarded += 1;
                    continue;
                }
                NullStrategy::Default => (a.value().unwrap_or(0), p.value().unwrap_or(0), true),
            },
        };
        out.valid += 1;
        if defaulted {
            out.defaulted += 1;
        }

        if actual <= min_value_filter || predicted <= min_value_filter {
            log.dropped(dropped, index, "at or below min_value_filter");
            dropped += 1;
            out.below_threshold += 1;
            continue;
        }

        out.kept.push(NormalizedRecord {
            index,
            actual,
            predicted,
            defaulted,
        });
    }

    Ok(out)
}
