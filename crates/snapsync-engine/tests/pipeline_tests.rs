// Test suite for the job runner: per-job export, declaration ordering,
// and fail-fast behavior across jobs.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use snapsync_core::{ErrorKind, Result, Row, SnapError, SnapshotDocument, SnapshotJob};
use snapsync_db::{QueryClient, RetryPolicy};
use snapsync_engine::run_jobs;
use tempfile::TempDir;

/// Fake source database: per-table column sets and a fixed row set keyed
/// by the FROM table embedded in the SQL.
struct FakeDb {
    tables: HashMap<String, HashSet<String>>,
    rows_per_table: HashMap<String, Vec<Row>>,
}

impl FakeDb {
    fn new() -> Self {
        Self {
            tables: HashMap::new(),
            rows_per_table: HashMap::new(),
        }
    }

    fn table(mut self, name: &str, columns: &[&str], rows: usize) -> Self {
        self.tables.insert(
            name.to_string(),
            columns.iter().map(|c| c.to_string()).collect(),
        );
        let rows = (0..rows)
            .map(|i| {
                let mut row = Row::new();
                for col in columns {
                    row.insert(col.to_string(), serde_json::json!(format!("{}-{}", col, i)));
                }
                row
            })
            .collect();
        self.rows_per_table.insert(name.to_string(), rows);
        self
    }
}

#[async_trait]
impl QueryClient for FakeDb {
    async fn fetch_all(&self, sql: &str, _params: &[Value]) -> Result<Vec<Row>> {
        for (table, rows) in &self.rows_per_table {
            if sql.contains(&format!("FROM {}", table)) {
                return Ok(rows.clone());
            }
        }
        Err(SnapError::new(ErrorKind::Database)
            .with_op("fetch_all")
            .with_message(format!("unknown relation in: {}", sql)))
    }

    async fn table_columns(&self, table: &str) -> Result<HashSet<String>> {
        Ok(self.tables.get(table).cloned().unwrap_or_default())
    }
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        retries: 0,
        delay: Duration::from_millis(1),
    }
}

#[tokio::test]
async fn test_run_jobs_writes_one_file_per_job() {
    let dir = TempDir::new().unwrap();
    let db = FakeDb::new()
        .table("progress", &["code", "progress_date"], 3)
        .table("cert", &["code", "user_rank"], 2);
    let jobs = vec![
        SnapshotJob::new("study_progress", "code, progress_date", "progress"),
        SnapshotJob::new("study_cert", "code, user_rank", "cert"),
    ];

    let written = run_jobs(&db, &jobs, dir.path(), fast_policy()).await.unwrap();

    assert_eq!(written.len(), 2);
    assert_eq!(written[0], dir.path().join("study_progress.json"));
    assert_eq!(written[1], dir.path().join("study_cert.json"));

    let doc: SnapshotDocument =
        serde_json::from_str(&std::fs::read_to_string(&written[0]).unwrap()).unwrap();
    assert_eq!(doc.row_count, 3);
    assert_eq!(doc.row_count, doc.rows.len());
    assert!(doc.source.query.contains("FROM progress"));
}

#[tokio::test]
async fn test_missing_column_aborts_run_before_writing() {
    let dir = TempDir::new().unwrap();
    let db = FakeDb::new().table("progress", &["code"], 1);
    let jobs = vec![SnapshotJob::new("study_progress", "code, typo_col", "progress")];

    let err = run_jobs(&db, &jobs, dir.path(), fast_policy())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MissingColumn);
    assert!(err.message().contains("typo_col"));
    assert!(!dir.path().join("study_progress.json").exists());
}

#[tokio::test]
async fn test_failure_in_second_job_is_fatal_but_first_file_remains() {
    let dir = TempDir::new().unwrap();
    let db = FakeDb::new().table("progress", &["code"], 2);
    let jobs = vec![
        SnapshotJob::new("study_progress", "code", "progress"),
        // Unknown relation: column validation passes (empty set rejects),
        // so use a wildcard to reach the query stage.
        SnapshotJob::new("broken", "*", "missing_table"),
    ];

    let err = run_jobs(&db, &jobs, dir.path(), fast_policy())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Database);
    assert!(dir.path().join("study_progress.json").exists());
    assert!(!dir.path().join("broken.json").exists());
}

#[tokio::test]
async fn test_wildcard_job_skips_validation() {
    let dir = TempDir::new().unwrap();
    let db = FakeDb::new().table("cert", &["code"], 1);
    let jobs = vec![SnapshotJob::new("all_cert", "*", "cert")];

    let written = run_jobs(&db, &jobs, dir.path(), fast_policy()).await.unwrap();

    let doc: SnapshotDocument =
        serde_json::from_str(&std::fs::read_to_string(&written[0]).unwrap()).unwrap();
    assert!(doc.source.query.starts_with("SELECT * FROM cert"));
}

#[tokio::test]
async fn test_sql_includes_ordering_clause() {
    let dir = TempDir::new().unwrap();
    let db = FakeDb::new().table("progress", &["code", "d"], 1);
    let jobs = vec![SnapshotJob::new("ordered", "code, d", "progress").with_order_by("code, d")];

    let written = run_jobs(&db, &jobs, dir.path(), fast_policy()).await.unwrap();

    let doc: SnapshotDocument =
        serde_json::from_str(&std::fs::read_to_string(&written[0]).unwrap()).unwrap();
    assert!(doc.source.query.ends_with("ORDER BY code, d"));
}
