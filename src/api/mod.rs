//! REST API server module
//!
//! Thin HTTP surface over [`OutreachRunner`](crate::OutreachRunner): start a
//! run, cancel it, watch its events, and reach the lead directory directly.

use crate::Result;
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod error_response;
pub mod routes;
pub mod state;

pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Automation
/// - `POST /api/automation` - Run outreach (responds when the run ends)
/// - `GET /api/automation` - Whether a run is in flight
/// - `POST /api/automation/cancel` - Cancel the active run
/// - `GET /api/automation/events` - Server-sent events stream
///
/// ## Directory
/// - `GET /api/search/people` - One page of a lead list
/// - `POST /api/connect` - Send a connection request
/// - `POST /api/remove` - Remove a lead from a lead list
///
/// ## System
/// - `GET /health` - Health check
pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    let router = Router::new()
        // Automation
        .route("/api/automation", post(routes::run_automation))
        .route("/api/automation", get(routes::automation_status))
        .route("/api/automation/cancel", post(routes::cancel_automation))
        .route("/api/automation/events", get(routes::event_stream))
        // Directory
        .route("/api/search/people", get(routes::search_people))
        .route("/api/connect", post(routes::connect))
        .route("/api/remove", post(routes::remove_from_list))
        // System
        .route("/health", get(routes::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    // Apply CORS middleware if enabled in config
    if config.server.cors_enabled {
        let cors = build_cors_layer(&config.server.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` (or an empty list) allows any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Runs until the server fails. Use [`serve_until`] for graceful shutdown.
///
/// # Example
///
/// ```no_run
/// use lead_outreach::{Config, OutreachRunner};
/// use lead_outreach::api::{AppState, start_api_server};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let runner = OutreachRunner::from_config(&config)?;
///
/// start_api_server(AppState::new(runner, Arc::new(config))).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(state: AppState) -> Result<()> {
    serve_until(state, std::future::pending()).await
}

/// Serve the API until `shutdown` resolves, then drain in-flight requests
pub async fn serve_until<F>(state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = state.config.server.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(state);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %listener.local_addr().map_err(crate::error::Error::Io)?,
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
