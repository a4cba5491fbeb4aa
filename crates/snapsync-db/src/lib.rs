//! SnapSync DB - Read-only query execution
//!
//! Provides the `QueryClient` trait seam (so the pipeline and tests can
//! substitute a fake), the MySQL implementation over an sqlx pool, a
//! linear-backoff retry wrapper for transient errors, and the pre-flight
//! column validator that cross-checks job select clauses against live
//! schema metadata.

pub mod client;
pub mod retry;
pub mod validator;

pub use client::{MySqlClient, QueryClient};
pub use retry::{fetch_all_retry, RetryPolicy};
pub use validator::validated_select;
