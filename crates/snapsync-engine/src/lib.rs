//! SnapSync Engine - Snapshot job pipeline
//!
//! Orchestrates the export run: for each job in the static list, validate
//! the select clause, execute the query with retry, wrap the result in a
//! snapshot document, and write it atomically. A failure in any job is
//! fatal to the whole run; no partial-success continuation is attempted.
//! After a successful export the git sync driver can reconcile the files
//! with the remote.

pub mod runner;

pub use runner::{run_jobs, run_pipeline, sync_snapshots, PipelineReport};
