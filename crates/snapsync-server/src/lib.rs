//! SnapSync Server - Read-only HTTP surface over snapshot files
//!
//! Serves the generated snapshots through paging/filtering/grouping views
//! and a single-page Chart.js dashboard. All handlers are read-only and
//! stateless aside from the mtime-keyed snapshot cache. Missing or
//! malformed snapshot files surface as 500s with structured diagnostic
//! detail (error code, message, parse location).

pub mod error;
pub mod routes;
pub mod state;
pub mod views;

use std::net::SocketAddr;
use std::sync::Arc;

use snapsync_core::errors::io_error;
use snapsync_core::Result;

pub use error::ApiError;
pub use routes::app;
pub use state::AppState;

/// Bind and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| io_error("bind", e))?;
    tracing::info!(%addr, "Serving snapshot API");
    axum::serve(listener, app(state))
        .await
        .map_err(|e| io_error("serve", e))
}
