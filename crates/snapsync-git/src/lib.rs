//! SnapSync Git - Best-effort snapshot auto-sync
//!
//! A narrow, typed layer over a fixed sequence of git operations: stage the
//! generated snapshot files, commit, push, and reconcile with a remote that
//! may have diverged. Conflicts on registered snapshot paths are always
//! resolved in favor of the local run ("ours"); this is a deliberately
//! lossy policy, so concurrent human edits to snapshot files on the remote
//! are discarded by the next sync.
//!
//! The driver runs unattended after every snapshot generation, so almost
//! every step is non-fatal: failures are absorbed into the sync report's
//! notes rather than blocking the run. Only the initial repository check
//! (and the final push in strict mode) abort.

pub mod command;
pub mod driver;

pub use command::{GitOutput, GitRunner, ProcessRunner};
pub use driver::{SyncDriver, SyncOptions, SyncOutcome, SyncReport};
