//! Serve command: read-only dashboard API over the snapshot files.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use snapsync_core::{default_jobs, Config, Result};
use snapsync_engine::sync_snapshots;
use snapsync_git::SyncOptions;
use snapsync_server::AppState;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen address
    #[arg(long, default_value = "0.0.0.0:8000")]
    pub addr: SocketAddr,
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let config = Config::from_env()?;
    let data_dir = PathBuf::from(&config.data_dir);

    // Optional one-shot sync at startup; failures are logged, never fatal,
    // and the server does not wait for it.
    if config.git.push_on_start {
        let mut options = SyncOptions::for_branch(&config.git.branch);
        options.allow_empty = config.git.allow_empty;
        let paths: Vec<PathBuf> = default_jobs()
            .iter()
            .map(|job| job.output_path(&data_dir))
            .filter(|path| path.exists())
            .collect();
        let _detached = tokio::task::spawn_blocking(move || {
            match std::env::current_dir() {
                Ok(root) => match sync_snapshots(&root, options, &paths) {
                    Ok(report) => tracing::info!(outcome = ?report.outcome, "Startup sync finished"),
                    Err(e) => tracing::warn!(error = %e, "Startup sync failed"),
                },
                Err(e) => tracing::warn!(error = %e, "Startup sync skipped: no working directory"),
            }
        });
    }

    let state = Arc::new(AppState::new(&data_dir));
    snapsync_server::serve(args.addr, state).await
}
