//! # lead-outreach
//!
//! Paced, failure-isolated outreach automation over paginated lead lists.
//!
//! A run walks a lead list page by page, drops candidates that already have a
//! pending invitation, asks a qualification oracle whether each remaining
//! candidate is worth contacting (and what to say), sends the connection
//! request, and waits a randomized interval before the next one.
//!
//! ## Design Philosophy
//!
//! - **Injected collaborators** - the lead directory and the oracle are traits;
//!   HTTP implementations ship with the crate, tests use scripted doubles
//! - **One failure, one entry** - a candidate that fails is recorded and the
//!   run moves on; only a failed page fetch ends a run early
//! - **Deterministic when asked** - pacing goes through an injectable sleeper
//!   and a seedable RNG
//! - **Event-driven** - consumers subscribe to run events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use lead_outreach::{Config, OutreachRunner, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config
//!         .directory
//!         .extra_headers
//!         .insert("csrf-token".to_string(), "ajax:0123456789".to_string());
//!
//!     let runner = OutreachRunner::from_config(&config)?;
//!
//!     // Subscribe to events
//!     let mut events = runner.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let result = runner
//!         .run_automation(RunConfig::new(25, "Hi {{firstName}}, ...", "7371658687360155648"))
//!         .await;
//!     println!("{}", result.message);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Lead directory trait and HTTP client
pub mod directory;
/// Error types
pub mod error;
/// Qualification oracle trait, Gemini client and prompt
pub mod oracle;
/// Outreach orchestration (decomposed into focused submodules)
pub mod outreach;
/// Retry logic with exponential backoff
pub mod retry;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, RunConfig};
pub use directory::{HttpLeadDirectory, LeadDirectory};
pub use error::{
    ApiError, DirectoryError, Error, ErrorDetail, OracleError, Result, ToHttpStatus,
};
pub use oracle::{GeminiOracle, QualificationOracle};
pub use outreach::{OutreachRunner, RunnerSettings, Sleeper, UnqualifiedPolicy};
pub use types::{Candidate, Event, ItemError, Page, RunOutcome, RunResult};

/// Serve the REST API with graceful signal handling.
///
/// Serves until SIGTERM or Ctrl+C (Ctrl+C only off unix), then behaves like
/// [`run_until`].
///
/// # Example
///
/// ```no_run
/// use lead_outreach::{Config, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     run_with_shutdown(Config::default()).await?;
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(config: Config) -> Result<()> {
    run_until(config, wait_for_signal()).await
}

/// Serve the REST API until `shutdown` resolves.
///
/// Builds a runner from `config`. When `shutdown` resolves the active run, if
/// any, is cancelled so its request can return partial results before the
/// server stops.
pub async fn run_until<F>(config: Config, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let runner = OutreachRunner::from_config(&config)?;
    let state = api::AppState::new(runner.clone(), std::sync::Arc::new(config));

    api::serve_until(state, async move {
        shutdown.await;
        if runner.cancel_current() {
            tracing::info!("Cancelled active outreach run for shutdown");
        }
    })
    .await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM signal"),
                _ = tokio::signal::ctrl_c() => tracing::info!("Received Ctrl+C signal"),
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for Ctrl+C only");
            wait_for_ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C signal"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C signal"),
    }
}
