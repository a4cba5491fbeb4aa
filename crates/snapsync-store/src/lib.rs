//! SnapSync Store - Snapshot file persistence
//!
//! Owns the on-disk lifecycle of snapshot documents:
//! - atomic writer (temp file, re-parse validation, rename-over)
//! - tolerant reader accepting both historical file shapes
//! - modification-time keyed in-memory cache for the HTTP surface
//!
//! The writer's atomic-replace discipline is the only protection readers
//! get; there is no cross-process lock, and concurrent writer runs are not
//! safe against each other (only against readers).

pub mod cache;
pub mod reader;
pub mod writer;

pub use cache::SnapshotCache;
pub use reader::load_rows;
pub use writer::write_snapshot;
