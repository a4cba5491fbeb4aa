// Test suite for the retry policy and the pre-flight column validator.
// Uses a fake QueryClient at the trait seam instead of a live database.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use snapsync_core::{ErrorKind, Result, Row, SnapError, SnapshotJob};
use snapsync_db::{fetch_all_retry, validated_select, QueryClient, RetryPolicy};

/// Fails the first `failures` fetch_all calls with a transient error, then
/// succeeds with a fixed row set.
struct FakeClient {
    failures: u32,
    fail_kind: ErrorKind,
    columns: HashSet<String>,
    calls: AtomicU32,
}

impl FakeClient {
    fn new(failures: u32, fail_kind: ErrorKind) -> Self {
        Self {
            failures,
            fail_kind,
            columns: ["a", "b", "c"].iter().map(|s| s.to_string()).collect(),
            calls: AtomicU32::new(0),
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryClient for FakeClient {
    async fn fetch_all(&self, _sql: &str, _params: &[Value]) -> Result<Vec<Row>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(SnapError::new(self.fail_kind).with_op("fetch_all"));
        }
        let mut row = Row::new();
        row.insert("a".to_string(), serde_json::json!(1));
        Ok(vec![row])
    }

    async fn table_columns(&self, _table: &str) -> Result<HashSet<String>> {
        Ok(self.columns.clone())
    }
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        retries: 2,
        delay: Duration::from_millis(1),
    }
}

#[tokio::test]
async fn test_retry_succeeds_within_budget() {
    // 2 transient failures, retries=2: third attempt succeeds.
    let client = FakeClient::new(2, ErrorKind::Database);
    let rows = fetch_all_retry(&client, "SELECT a FROM t", &[], fast_policy())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn test_retry_exhaustion_propagates_error() {
    // 3 transient failures exceed retries=2; the underlying error surfaces.
    let client = FakeClient::new(3, ErrorKind::Database);
    let err = fetch_all_retry(&client, "SELECT a FROM t", &[], fast_policy())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Database);
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn test_timeout_is_also_retried() {
    let client = FakeClient::new(1, ErrorKind::Timeout);
    fetch_all_retry(&client, "SELECT a FROM t", &[], fast_policy())
        .await
        .unwrap();
    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn test_non_transient_error_fails_immediately() {
    let client = FakeClient::new(1, ErrorKind::MissingColumn);
    let err = fetch_all_retry(&client, "SELECT a FROM t", &[], fast_policy())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingColumn);
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_validator_accepts_existing_columns() {
    let client = FakeClient::new(0, ErrorKind::Database);
    let job = SnapshotJob::new("t", "a, b", "things");
    let select = validated_select(&client, &job).await.unwrap();
    assert_eq!(select, "a, b");
}

#[tokio::test]
async fn test_validator_rejects_missing_column_by_name() {
    let client = FakeClient::new(0, ErrorKind::Database);
    let job = SnapshotJob::new("t", "a, d", "things");
    let err = validated_select(&client, &job).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingColumn);
    // Names exactly the absent column, not the present one.
    assert!(err.message().contains("d"));
    assert!(!err.message().contains("a,"));
    assert!(err.message().contains("things"));
}

#[tokio::test]
async fn test_validator_lists_every_missing_column() {
    let client = FakeClient::new(0, ErrorKind::Database);
    let job = SnapshotJob::new("t", "x, a, y", "things");
    let err = validated_select(&client, &job).await.unwrap_err();
    assert!(err.message().contains("x, y"));
}

#[tokio::test]
async fn test_validator_wildcard_bypasses_schema_lookup() {
    let client = FakeClient::new(0, ErrorKind::Database);
    let job = SnapshotJob::new("t", "*", "things");
    let select = validated_select(&client, &job).await.unwrap();
    assert_eq!(select, "*");
}
