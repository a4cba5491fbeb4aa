//! Pre-flight column validation
//!
//! Cross-checks a job's select clause against the live column set of its
//! source relation, failing with ERR_MISSING_COLUMN (listing every absent
//! column) before any SQL is built. Catches typos in the static job list at
//! run time instead of producing a silently malformed snapshot.

use snapsync_core::columns::{is_wildcard, parse_select_columns, WILDCARD};
use snapsync_core::{ErrorKind, Result, SnapError, SnapshotJob};

use crate::client::QueryClient;

/// Validate the job's select clause against schema metadata and return the
/// clause to use in the final SQL. The wildcard selector bypasses
/// validation entirely.
pub async fn validated_select(client: &dyn QueryClient, job: &SnapshotJob) -> Result<String> {
    if is_wildcard(&job.select) {
        return Ok(WILDCARD.to_string());
    }

    let live = client.table_columns(&job.from).await?;
    let requested = parse_select_columns(&job.select);
    let missing: Vec<String> = requested
        .into_iter()
        .filter(|col| !live.contains(col))
        .collect();

    if !missing.is_empty() {
        return Err(SnapError::new(ErrorKind::MissingColumn)
            .with_op("validated_select")
            .with_message(format!(
                "Missing columns in {}: {}",
                job.from,
                missing.join(", ")
            )));
    }

    Ok(job.select.clone())
}
