//! Shared server state

use std::path::{Path, PathBuf};
use std::sync::Arc;

use snapsync_core::{Result, Row};
use snapsync_store::SnapshotCache;

/// Read-only state shared across request handlers.
pub struct AppState {
    cache: SnapshotCache,
    progress_path: PathBuf,
    cert_path: PathBuf,
}

impl AppState {
    /// State over the two-file dataset under `data_dir`
    /// (`study_progress.json` + `study_cert.json`).
    pub fn new(data_dir: &Path) -> Self {
        Self {
            cache: SnapshotCache::new(),
            progress_path: data_dir.join("study_progress.json"),
            cert_path: data_dir.join("study_cert.json"),
        }
    }

    pub fn progress_rows(&self) -> Result<Arc<Vec<Row>>> {
        self.cache.rows(&self.progress_path)
    }

    pub fn cert_rows(&self) -> Result<Arc<Vec<Row>>> {
        self.cache.rows(&self.cert_path)
    }
}
