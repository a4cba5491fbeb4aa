//! Tolerant snapshot reader
//!
//! Accepts both historical file shapes: a bare array of records, or the
//! full document object with a `rows` array. Tolerates a UTF-8 BOM on read
//! (some upstream tooling re-saved snapshots with one). Parse failures
//! surface the error location for the HTTP caller's diagnostics.

use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

use snapsync_core::{ErrorKind, Result, Row, SnapError};

/// Load the record list from a snapshot file.
pub fn load_rows(path: &Path) -> Result<Vec<Row>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == IoErrorKind::NotFound => {
            return Err(SnapError::new(ErrorKind::SnapshotMissing)
                .with_op("load_rows")
                .with_path(path)
                .with_message("snapshot file not found"));
        }
        Err(e) => {
            return Err(SnapError::new(ErrorKind::Io)
                .with_op("load_rows")
                .with_path(path)
                .with_message(e.to_string()));
        }
    };
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| {
        SnapError::new(ErrorKind::SnapshotMalformed)
            .with_op("load_rows")
            .with_path(path)
            .with_message(format!(
                "invalid JSON at line {} column {}: {}",
                e.line(),
                e.column(),
                e
            ))
    })?;

    rows_from_value(value).ok_or_else(|| {
        SnapError::new(ErrorKind::SnapshotMalformed)
            .with_op("load_rows")
            .with_path(path)
            .with_message("Unexpected JSON format: expected an array or an object with a rows array")
    })
}

/// Extract records from either accepted shape.
fn rows_from_value(value: serde_json::Value) -> Option<Vec<Row>> {
    let array = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut doc) => match doc.remove("rows") {
            Some(serde_json::Value::Array(items)) => items,
            _ => return None,
        },
        _ => return None,
    };
    array
        .into_iter()
        .map(|item| match item {
            serde_json::Value::Object(record) => Some(record),
            _ => None,
        })
        .collect()
}
