//! Sync command: push snapshot files already on disk, without re-exporting.

use std::path::PathBuf;

use clap::Args;
use snapsync_core::errors::io_error;
use snapsync_core::{default_jobs, Config, ErrorKind, Result, SnapError};
use snapsync_engine::sync_snapshots;
use snapsync_git::SyncOptions;

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Treat a failed push as a fatal error
    #[arg(long)]
    pub strict: bool,
}

pub async fn execute(args: SyncArgs) -> Result<()> {
    let config = Config::from_env()?;

    let data_dir = PathBuf::from(&config.data_dir);
    let paths: Vec<PathBuf> = default_jobs()
        .iter()
        .map(|job| job.output_path(&data_dir))
        .filter(|path| path.exists())
        .collect();
    if paths.is_empty() {
        return Err(SnapError::new(ErrorKind::SnapshotMissing)
            .with_op("sync")
            .with_path(data_dir)
            .with_message("No snapshot files to sync; run `snapsync export` first"));
    }

    let mut options = SyncOptions::for_branch(&config.git.branch);
    options.allow_empty = config.git.allow_empty;
    options.strict_push = args.strict;

    let repo_root = std::env::current_dir().map_err(|e| io_error("current_dir", e))?;
    let report = tokio::task::spawn_blocking(move || sync_snapshots(&repo_root, options, &paths))
        .await
        .map_err(|e| {
            SnapError::new(ErrorKind::Internal)
                .with_op("sync")
                .with_message(format!("sync task panicked: {}", e))
        })??;

    super::print_sync_report(&report);
    Ok(())
}
