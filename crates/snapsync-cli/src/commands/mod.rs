pub mod export;
pub mod serve;
pub mod sync;

use snapsync_git::{SyncOutcome, SyncReport};

/// One-line, operator-facing summary of a sync run.
pub(crate) fn print_sync_report(report: &SyncReport) {
    match report.outcome {
        SyncOutcome::Synced => {
            println!(
                "Synced: local {} / remote {}",
                report.local_head.as_deref().unwrap_or("?"),
                report.remote_head.as_deref().unwrap_or("?")
            );
        }
        SyncOutcome::Degraded => {
            println!("Sync degraded (remote not updated):");
            for note in &report.notes {
                println!("  - {}", note);
            }
        }
        SyncOutcome::Skipped => println!("Sync skipped"),
    }
}
