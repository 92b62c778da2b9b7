//! Axis label resolution.
//!
//! Priority: mark list entry (by `value` or `id`), then the description of the
//! first record with that actual value, then a synthesized `value{N}`.
//! Records carrying an invalid-data marker never supply a label.

use serde::{Deserialize, Deserializer, Serialize};

use crate::debug::CalcLog;
use crate::error::ReportResult;
use crate::ingest::types::Record;
use crate::normalize::parse_lenient;

/// Record description that marks a row as unusable for labelling.
pub const INVALID_DATA_SENTINEL: &str = "invalid data";
/// Same marker as written by older report exports.
pub const LEGACY_INVALID_DATA_SENTINEL: &str = "无效数据";

fn is_sentinel(desc: &str) -> bool {
    desc == INVALID_DATA_SENTINEL || desc == LEGACY_INVALID_DATA_SENTINEL
}

/// One entry of the mark (label) list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MarkEntry {
    #[serde(default, deserialize_with = "scalar_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub desc: Option<String>,
}

impl MarkEntry {
    pub fn new(value: impl ToString, desc: impl Into<String>) -> Self {
        Self {
            id: None,
            value: Some(value.to_string()),
            desc: Some(desc.into()),
        }
    }

    fn matches(&self, key: &str) -> bool {
        self.value.as_deref() == Some(key) || self.id.as_deref() == Some(key)
    }
}

/// Accepts strings, numbers and booleans; numbers are stringified.
fn scalar_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        S(String),
        I(i64),
        F(f64),
        B(bool),
    }
    Ok(Option::<Scalar>::deserialize(d)?.map(|s| match s {
        Scalar::S(s) => s,
        Scalar::I(i) => i.to_string(),
        Scalar::F(f) => f.to_string(),
        Scalar::B(b) => b.to_string(),
    }))
}

/// Parse a JSON array of mark entries.
pub fn marks_from_json(input: &str) -> ReportResult<Vec<MarkEntry>> {
    Ok(serde_json::from_str(input)?)
}

/// Resolve the human-readable label for `value`. Never fails.
pub fn resolve_label<P>(value: i64, marks: &[MarkEntry], records: &[Record<P>]) -> String {
    resolve_label_logged(value, marks, records, &CalcLog::default())
}

pub(crate) fn resolve_label_logged<P>(
    value: i64,
    marks: &[MarkEntry],
    records: &[Record<P>],
    log: &CalcLog,
) -> String {
    let key = value.to_string();

    // First matching mark decides; an empty desc falls through to the records.
    if let Some(mark) = marks.iter().find(|m| m.matches(&key)) {
        if let Some(desc) = mark.desc.as_deref().filter(|d| !d.is_empty()) {
            log.label(value, "mark", desc);
            return desc.to_string();
        }
    }

    let from_records = records
        .iter()
        .filter(|r| parse_lenient(&r.actual).value() == Some(value))
        .filter_map(|r| r.description.as_label())
        .find(|d| !is_sentinel(d));
    if let Some(desc) = from_records {
        log.label(value, "record", &desc);
        return desc;
    }

    let fallback = format!("value{value}");
    log.label(value, "default", &fallback);
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_list_wins_by_value_or_id() {
        let marks = vec![
            MarkEntry {
                id: Some("7".into()),
                value: None,
                desc: Some("by id".into()),
            },
            MarkEntry::new(1, "weather"),
        ];
        let recs = vec![Record::new(1, 1).described("from record")];
        assert_eq!(resolve_label(1, &marks, &recs), "weather");
        assert_eq!(resolve_label(7, &marks, &recs), "by id");
    }

    #[test]
    fn falls_back_to_record_description_skipping_sentinel() {
        let recs = vec![
            Record::new("2", 1).described(INVALID_DATA_SENTINEL),
            Record::new(2, 2).described(""),
            Record::new(2, 3).described("music"),
        ];
        assert_eq!(resolve_label(2, &[], &recs), "music");
    }

    #[test]
    fn legacy_sentinel_is_skipped_too() {
        let recs = vec![
            Record::new(5, 5).described(LEGACY_INVALID_DATA_SENTINEL),
            Record::new(5, 1).described("alarm"),
        ];
        assert_eq!(resolve_label(5, &[], &recs), "alarm");

        let only_sentinel = vec![Record::new(6, 6).described("无效数据")];
        assert_eq!(resolve_label(6, &[], &only_sentinel), "value6");
    }

    #[test]
    fn empty_mark_desc_falls_through() {
        let marks = vec![MarkEntry {
            id: None,
            value: Some("4".into()),
            desc: Some(String::new()),
        }];
        let recs = vec![Record::new(4, 4).described("navigation")];
        assert_eq!(resolve_label(4, &marks, &recs), "navigation");
    }

    #[test]
    fn synthesizes_default() {
        let recs: Vec<Record> = Vec::new();
        assert_eq!(resolve_label(999, &[], &recs), "value999");
        assert_eq!(resolve_label(0, &[], &recs), "value0");
    }

    #[test]
    fn numeric_mark_fields_are_stringified() {
        let m = marks_from_json(r#"[{"id": 5, "value": 5, "desc": "five"}]"#).unwrap();
        assert_eq!(m[0].value.as_deref(), Some("5"));
        assert_eq!(m[0].id.as_deref(), Some("5"));
    }
}
