//! Snapshot job definitions and SQL assembly
//!
//! A SnapshotJob names one query to materialize as `{data_dir}/{name}.json`.
//! Jobs come from a static configuration list and are immutable at run time.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Directory (relative to the repo root) holding generated snapshots.
pub const SNAPSHOT_DIR: &str = "data";

/// Glob covering every snapshot file; used for the merge=ours declaration.
pub const SNAPSHOT_GLOB: &str = "data/*.json";

/// A named, statically configured query definition producing one snapshot file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotJob {
    /// Output file stem; the snapshot lands at `{data_dir}/{name}.json`
    pub name: String,
    /// SELECT clause (comma-separated plain columns, or `*`)
    pub select: String,
    /// FROM clause (table or view name)
    pub from: String,
    /// Optional WHERE clause
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<String>,
    /// Optional ORDER BY clause (recommended for diff stability)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    /// Optional LIMIT (recommended for large relations)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl SnapshotJob {
    pub fn new(name: impl Into<String>, select: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            select: select.into(),
            from: from.into(),
            where_clause: None,
            order_by: None,
            limit: None,
        }
    }

    pub fn with_where(mut self, clause: impl Into<String>) -> Self {
        self.where_clause = Some(clause.into());
        self
    }

    pub fn with_order_by(mut self, clause: impl Into<String>) -> Self {
        self.order_by = Some(clause.into());
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Build the SELECT statement for this job using a (pre-validated)
    /// select clause. The caller is responsible for running the clause
    /// through the column validator first where validation is wanted.
    pub fn sql_for_select(&self, select: &str) -> String {
        let mut sql = format!("SELECT {} FROM {}", select, self.from);
        if let Some(where_clause) = &self.where_clause {
            sql.push_str(&format!(" WHERE {}", where_clause));
        }
        if let Some(order_by) = &self.order_by {
            sql.push_str(&format!(" ORDER BY {}", order_by));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        sql
    }

    /// Build the SELECT statement using the job's raw select clause.
    pub fn sql(&self) -> String {
        self.sql_for_select(&self.select)
    }

    /// Final output path for this job under the given data directory.
    pub fn output_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(format!("{}.json", self.name))
    }
}

/// The static job list. Edit this list to add or remove snapshots; each
/// entry produces one `data/{name}.json` file per run.
pub fn default_jobs() -> Vec<SnapshotJob> {
    vec![
        SnapshotJob::new(
            "study_progress",
            "opentalk_code, nickname, study_group_title, progress_date, progress",
            "json_study_user_progress",
        )
        .with_order_by("opentalk_code, nickname, study_group_title, progress_date"),
        SnapshotJob::new(
            "study_cert",
            "opentalk_code, name, user_rank, cert_days_count, average_week",
            "study_user_cert_wide",
        )
        .with_order_by("opentalk_code, name"),
    ]
}
