//! SnapSync CLI
//!
//! Command-line interface for the snapshot export/sync/serve pipeline.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "snapsync")]
#[command(about = "Database snapshot export, git sync and dashboard server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run all snapshot jobs, optionally pushing the results
    Export(commands::export::ExportArgs),
    /// Reconcile existing snapshot files with the remote
    Sync(commands::sync::SyncArgs),
    /// Serve the read-only dashboard API
    Serve(commands::serve::ServeArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Export(args) => commands::export::execute(args).await,
        Commands::Sync(args) => commands::sync::execute(args).await,
        Commands::Serve(args) => commands::serve::execute(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
