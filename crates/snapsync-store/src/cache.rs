//! Modification-time keyed snapshot cache
//!
//! Caches parsed row sets for the HTTP surface, invalidated when the file's
//! mtime changes (the writer's atomic rename bumps it). A single mutex
//! guards read and update, so two concurrent requests cannot race to
//! populate the same entry; cache misses are serialized by design.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use snapsync_core::{Result, Row};

use crate::reader::load_rows;

#[derive(Default)]
pub struct SnapshotCache {
    entries: Mutex<HashMap<PathBuf, CacheEntry>>,
}

struct CacheEntry {
    mtime: SystemTime,
    rows: Arc<Vec<Row>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the rows for a snapshot file, reloading if the file changed
    /// since the cached copy was parsed. Errors (missing or malformed
    /// file) are never cached.
    pub fn rows(&self, path: &Path) -> Result<Arc<Vec<Row>>> {
        let mtime = file_mtime(path);

        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let (Some(entry), Some(current)) = (entries.get(path), mtime) {
            if entry.mtime == current {
                return Ok(Arc::clone(&entry.rows));
            }
        }

        let rows = Arc::new(load_rows(path)?);
        if let Some(current) = mtime {
            tracing::debug!(path = %path.display(), rows = rows.len(), "Snapshot cache refresh");
            entries.insert(
                path.to_path_buf(),
                CacheEntry {
                    mtime: current,
                    rows: Arc::clone(&rows),
                },
            );
        }
        Ok(rows)
    }
}

fn file_mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
