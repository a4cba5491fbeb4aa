//! Atomic snapshot writer
//!
//! Serializes a document to `{path}.tmp` in the destination directory,
//! re-parses the temp file to confirm well-formed output, then renames it
//! over the final path. A reader of the final path never observes a partial
//! or syntactically invalid document: interruption before the rename leaves
//! the previous valid file (or none) in place.

use std::fs;
use std::path::Path;

use snapsync_core::errors::io_error;
use snapsync_core::{ErrorKind, Result, SnapError, SnapshotDocument};

/// Write a snapshot document to `path` via temp-file-then-atomic-replace.
pub fn write_snapshot(doc: &SnapshotDocument, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| io_error("create_snapshot_dir", e))?;
        }
    }

    let bytes = serde_json::to_vec(doc).map_err(|e| {
        SnapError::new(ErrorKind::Serialization)
            .with_op("write_snapshot")
            .with_message(format!("Failed to serialize document: {}", e))
    })?;

    // The temp file must live in the same directory as the destination so
    // the final rename stays on one filesystem (rename is only atomic then).
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &bytes)
        .map_err(|e| io_error("write_snapshot_tmp", e).with_path(&tmp_path))?;

    // Re-parse the temp file before the swap; if this fails the previous
    // valid snapshot is left untouched.
    let written = fs::read(&tmp_path)
        .map_err(|e| io_error("verify_snapshot_tmp", e).with_path(&tmp_path))?;
    serde_json::from_slice::<SnapshotDocument>(&written).map_err(|e| {
        SnapError::new(ErrorKind::Serialization)
            .with_op("verify_snapshot_tmp")
            .with_path(&tmp_path)
            .with_message(format!("Temp snapshot failed re-parse: {}", e))
    })?;

    fs::rename(&tmp_path, path).map_err(|e| io_error("replace_snapshot", e).with_path(path))?;

    tracing::info!(
        path = %path.display(),
        row_count = doc.row_count,
        size_bytes = bytes.len(),
        "Wrote snapshot"
    );

    Ok(())
}
