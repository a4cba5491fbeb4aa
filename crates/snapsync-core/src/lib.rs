//! SnapSync Core - Domain model for the snapshot export pipeline
//!
//! This crate provides the foundational types shared by the pipeline crates:
//! - SnapshotJob definitions and SQL assembly
//! - Select-clause column parsing for pre-flight validation
//! - The SnapshotDocument on-disk model with pinned-offset timestamps
//! - Environment-driven configuration with fail-fast validation
//! - The canonical structured error type used across the workspace

pub mod columns;
pub mod config;
pub mod document;
pub mod errors;
pub mod job;

// Re-export commonly used types
pub use config::{Config, DbConfig, GitConfig};
pub use document::{Row, SnapshotDocument, SnapshotSource};
pub use errors::{ErrorKind, Result, SnapError};
pub use job::{default_jobs, SnapshotJob};
