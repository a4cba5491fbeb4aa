//! Snapshot job runner and pipeline entry points

use std::path::{Path, PathBuf};

use snapsync_core::{Result, SnapshotDocument, SnapshotJob};
use snapsync_db::{fetch_all_retry, validated_select, QueryClient, RetryPolicy};
use snapsync_git::{ProcessRunner, SyncDriver, SyncOptions, SyncReport};
use snapsync_store::write_snapshot;

/// Result of one full pipeline run: the written snapshot paths plus the
/// sync report (Skipped when sync was gated off).
#[derive(Debug)]
pub struct PipelineReport {
    pub written: Vec<PathBuf>,
    pub sync: SyncReport,
}

/// Run every job in declaration order, producing `{data_dir}/{name}.json`
/// per job. The first failure (missing column, exhausted retries, write
/// error) aborts the run and propagates.
pub async fn run_jobs(
    client: &dyn QueryClient,
    jobs: &[SnapshotJob],
    data_dir: &Path,
    policy: RetryPolicy,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(jobs.len());
    for job in jobs {
        let select = validated_select(client, job).await?;
        let sql = job.sql_for_select(&select);
        tracing::debug!(job = %job.name, sql = %sql, "Executing snapshot job");

        let rows = fetch_all_retry(client, &sql, &[], policy).await?;
        let doc = SnapshotDocument::from_rows(&sql, rows);
        let path = job.output_path(data_dir);
        write_snapshot(&doc, &path)?;

        tracing::info!(
            job = %job.name,
            rows = doc.row_count,
            path = %path.display(),
            "Snapshot job complete"
        );
        written.push(path);
    }
    Ok(written)
}

/// Reconcile written snapshots with the remote. Blocking (subprocess I/O);
/// bridge with `spawn_blocking` from async contexts.
pub fn sync_snapshots(
    repo_root: &Path,
    options: SyncOptions,
    written: &[PathBuf],
) -> Result<SyncReport> {
    let paths: Vec<String> = written
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    let runner = ProcessRunner::new(repo_root);
    SyncDriver::new(&runner, repo_root, options).sync(&paths)
}

/// Full export run: all jobs, then an optional sync.
pub async fn run_pipeline(
    client: &dyn QueryClient,
    jobs: &[SnapshotJob],
    data_dir: &Path,
    policy: RetryPolicy,
    sync: Option<SyncOptions>,
) -> Result<PipelineReport> {
    let written = run_jobs(client, jobs, data_dir, policy).await?;

    let sync_report = match sync {
        Some(options) => {
            let repo_root = std::env::current_dir()
                .map_err(|e| snapsync_core::errors::io_error("current_dir", e))?;
            let paths = written.clone();
            tokio::task::spawn_blocking(move || sync_snapshots(&repo_root, options, &paths))
                .await
                .map_err(|e| {
                    snapsync_core::SnapError::new(snapsync_core::ErrorKind::Internal)
                        .with_op("run_pipeline")
                        .with_message(format!("sync task panicked: {}", e))
                })??
        }
        None => SyncReport::skipped(),
    };

    Ok(PipelineReport {
        written,
        sync: sync_report,
    })
}
