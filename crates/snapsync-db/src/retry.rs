//! Linear-backoff retry for transient database errors
//!
//! A query hitting a transient error (ERR_DATABASE, ERR_TIMEOUT) is retried
//! up to the configured count with a linearly increasing delay
//! (`delay x attempt`). On exhaustion the underlying error propagates
//! unmodified. Configuration errors and everything else fail immediately.

use std::time::Duration;

use serde_json::Value;
use snapsync_core::{Result, Row};

use crate::client::QueryClient;

/// Retry settings for one query.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt
    pub retries: u32,
    /// Base delay; attempt N waits `delay x N`
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            delay: Duration::from_millis(1500),
        }
    }
}

/// Execute a query through the client, retrying transient failures per the
/// policy.
pub async fn fetch_all_retry(
    client: &dyn QueryClient,
    sql: &str,
    params: &[Value],
    policy: RetryPolicy,
) -> Result<Vec<Row>> {
    let mut attempt: u32 = 0;
    loop {
        match client.fetch_all(sql, params).await {
            Ok(rows) => return Ok(rows),
            Err(err) if err.kind().is_transient() && attempt < policy.retries => {
                attempt += 1;
                let wait = policy.delay * attempt;
                tracing::warn!(
                    attempt,
                    retries = policy.retries,
                    wait_ms = wait.as_millis() as u64,
                    error = %err,
                    "Transient query failure; retrying"
                );
                tokio::time::sleep(wait).await;
            }
            Err(err) => return Err(err),
        }
    }
}
