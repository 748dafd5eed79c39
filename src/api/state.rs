//! Application state for the API server

use crate::{Config, OutreachRunner};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned per request; the runner and config are both cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Runner executing outreach runs, one at a time
    pub runner: OutreachRunner,

    /// Service configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(runner: OutreachRunner, config: Arc<Config>) -> Self {
        Self { runner, config }
    }
}
