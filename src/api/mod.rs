//! REST surface over the report runner and the department and employee lookups.
//!
//! ```text
//! axum handlers ──► ReportRunner / EmployeeDatabase ──► sqlx pool
//! ```

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::create_router;
pub use state::AppState;

use crate::error::{ReportError, Result};
use tracing::{info, warn};

/// Binds `bind` and serves the API until Ctrl-C.
pub async fn serve(bind: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| ReportError::config(format!("Cannot bind {bind}: {e}")))?;
    let addr = listener
        .local_addr()
        .map_err(|e| ReportError::internal(format!("Listener has no address: {e}")))?;

    info!("Server listening on http://{}", addr);
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ReportError::internal(format!("Server error: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
