//! Snapshot document model
//!
//! The on-disk JSON shape produced for every job:
//!
//! ```json
//! {
//!   "generated_at": "2025-09-10T12:00:00+09:00",
//!   "row_count": 2,
//!   "source": { "type": "sql", "query": "SELECT ..." },
//!   "rows": [ { "col": "value" }, ... ]
//! }
//! ```
//!
//! Documents are overwritten wholesale on every run; no incremental update
//! and no history beyond the source-control history of the file.

use chrono::{FixedOffset, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One result record: column name -> scalar value (values may be null).
///
/// `serde_json::Map` preserves insertion order (the workspace enables the
/// `preserve_order` feature), so the serialized record keeps the
/// select-clause column order.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Provenance of a snapshot document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSource {
    /// Source type discriminator (always "sql" for this pipeline)
    #[serde(rename = "type")]
    pub source_type: String,
    /// The exact query text that produced the rows
    pub query: String,
}

/// A point-in-time JSON materialization of a query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    /// Generation timestamp, RFC3339 with the pinned +09:00 offset
    pub generated_at: String,
    /// Number of records in `rows` (always equal to `rows.len()`)
    pub row_count: usize,
    pub source: SnapshotSource,
    pub rows: Vec<Row>,
}

impl SnapshotDocument {
    /// Wrap a query result in a document with the current timestamp.
    pub fn from_rows(query: &str, rows: Vec<Row>) -> Self {
        Self {
            generated_at: now_iso(),
            row_count: rows.len(),
            source: SnapshotSource {
                source_type: "sql".to_string(),
                query: query.trim().to_string(),
            },
            rows,
        }
    }
}

/// Snapshot timestamps are pinned to +09:00 (Asia/Seoul, no DST) so the
/// generated_at field is consistent regardless of the host timezone.
const SNAPSHOT_OFFSET_SECS: i32 = 9 * 3600;

/// Current time as an RFC3339 string in the pinned snapshot offset.
pub fn now_iso() -> String {
    match FixedOffset::east_opt(SNAPSHOT_OFFSET_SECS) {
        Some(offset) => Utc::now()
            .with_timezone(&offset)
            .to_rfc3339_opts(SecondsFormat::Micros, false),
        // The constant offset is always in range; fall back to UTC anyway.
        None => Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, serde_json::Value)]) -> Row {
        let mut m = Row::new();
        for (k, v) in pairs {
            m.insert(k.to_string(), v.clone());
        }
        m
    }

    #[test]
    fn test_row_count_matches_rows_len() {
        let rows = vec![
            row(&[("id", serde_json::json!(1))]),
            row(&[("id", serde_json::json!(2))]),
            row(&[("id", serde_json::Value::Null)]),
        ];
        let doc = SnapshotDocument::from_rows("SELECT id FROM t", rows);
        assert_eq!(doc.row_count, 3);
        assert_eq!(doc.row_count, doc.rows.len());
    }

    #[test]
    fn test_query_text_is_trimmed() {
        let doc = SnapshotDocument::from_rows("  SELECT 1  \n", vec![]);
        assert_eq!(doc.source.query, "SELECT 1");
        assert_eq!(doc.source.source_type, "sql");
    }

    #[test]
    fn test_generated_at_carries_pinned_offset() {
        let doc = SnapshotDocument::from_rows("SELECT 1", vec![]);
        assert!(doc.generated_at.ends_with("+09:00"));
    }

    #[test]
    fn test_serialized_row_keeps_insertion_column_order() {
        // Non-alphabetical insertion order must survive serialization.
        let rows = vec![row(&[
            ("opentalk_code", serde_json::json!("c1")),
            ("nickname", serde_json::json!("alice")),
            ("average_week", serde_json::json!(3.5)),
        ])];
        let doc = SnapshotDocument::from_rows("SELECT 1", rows);
        let text = serde_json::to_string(&doc).unwrap();

        let code = text.find("opentalk_code").unwrap();
        let nick = text.find("nickname").unwrap();
        let avg = text.find("average_week").unwrap();
        assert!(code < nick && nick < avg, "columns reordered in: {}", text);
    }

    #[test]
    fn test_round_trips_through_json() {
        let rows = vec![row(&[
            ("name", serde_json::json!("alice")),
            ("progress", serde_json::json!(0.75)),
        ])];
        let doc = SnapshotDocument::from_rows("SELECT name, progress FROM p", rows);
        let text = serde_json::to_string(&doc).unwrap();
        let restored: SnapshotDocument = serde_json::from_str(&text).unwrap();
        assert_eq!(restored, doc);
    }
}
