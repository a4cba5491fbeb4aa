//! Export command: run every snapshot job, then (optionally) sync.

use std::path::Path;

use clap::Args;
use snapsync_core::{default_jobs, Config, Result};
use snapsync_db::{MySqlClient, RetryPolicy};
use snapsync_engine::run_pipeline;
use snapsync_git::SyncOptions;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Push the snapshots after exporting (overrides PUSH_ON_RUN)
    #[arg(long, conflicts_with = "no_push")]
    pub push: bool,

    /// Skip the push even if PUSH_ON_RUN is set
    #[arg(long, conflicts_with = "push")]
    pub no_push: bool,

    /// Output directory for snapshot files (overrides DATA_DIR)
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Treat a failed push as a fatal error
    #[arg(long)]
    pub strict: bool,
}

pub async fn execute(args: ExportArgs) -> Result<()> {
    let config = Config::from_env()?;
    let data_dir = args.data_dir.unwrap_or_else(|| config.data_dir.clone());

    let push = if args.push {
        true
    } else if args.no_push {
        false
    } else {
        config.git.push_on_run
    };
    let sync = push.then(|| {
        let mut options = SyncOptions::for_branch(&config.git.branch);
        options.allow_empty = config.git.allow_empty;
        options.strict_push = args.strict;
        options
    });

    let client = MySqlClient::connect(&config.db).await?;
    let jobs = default_jobs();
    let report = run_pipeline(
        &client,
        &jobs,
        Path::new(&data_dir),
        RetryPolicy::default(),
        sync,
    )
    .await?;

    for path in &report.written {
        println!("Wrote {}", path.display());
    }
    super::print_sync_report(&report.sync);
    Ok(())
}
