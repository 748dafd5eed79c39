//! Outreach orchestration split into focused submodules.
//!
//! [`OutreachRunner`] drives one run at a time through:
//! - [`pager`] - next batch window
//! - [`filter`] - pending-invitation filtering and skip counts
//! - [`qualifier`] - oracle call and verdict normalization
//! - [`dispatcher`] - contact action and the unqualified-candidate hook
//! - [`pacer`] - randomized delays through an injectable [`Sleeper`]
//! - [`state`] - counters, cursor and the final report
//! - `orchestration` - the fetch/filter/process/decide loop

pub mod dispatcher;
pub mod filter;
mod orchestration;
pub mod pacer;
pub mod pager;
pub mod qualifier;
pub mod state;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use dispatcher::{Dispatcher, UnqualifiedPolicy};
pub use filter::{FilteredPage, filter_page};
pub use pacer::{Pacer, Sleeper, TokioSleeper};
pub use pager::{Window, next_window};
pub use qualifier::Qualifier;
pub use state::{RunState, failure_result};

use crate::config::{Config, PAGE_CAP, RetryConfig, RunConfig};
use crate::directory::{HttpLeadDirectory, LeadDirectory};
use crate::error::{Error, Result};
use crate::oracle::{GeminiOracle, QualificationOracle};
use crate::types::{Event, RunResult};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Runner-wide knobs that do not change between runs
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Largest window requested from the directory
    pub page_cap: u32,
    /// Lower bound of the inter-page delay in seconds
    pub page_delay_min_secs: u64,
    /// Upper bound of the inter-page delay in seconds
    pub page_delay_max_secs: u64,
    /// Retry policy for page fetches
    pub fetch_retry: RetryConfig,
    /// What happens to candidates the oracle rejects
    pub unqualified_policy: UnqualifiedPolicy,
    /// Fixed RNG seed for reproducible pacing
    pub seed: Option<u64>,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            page_cap: PAGE_CAP,
            page_delay_min_secs: 2,
            page_delay_max_secs: 5,
            fetch_retry: RetryConfig::default(),
            unqualified_policy: UnqualifiedPolicy::default(),
            seed: None,
        }
    }
}

impl RunnerSettings {
    /// Take page and retry knobs from service configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            page_cap: config.directory.page_cap,
            page_delay_min_secs: config.pacing.page_delay_min_secs,
            page_delay_max_secs: config.pacing.page_delay_max_secs,
            fetch_retry: config.fetch_retry.clone(),
            ..Default::default()
        }
    }

    /// Same checks as [`Config::validate`] for settings built by hand
    pub fn validate(&self) -> Result<()> {
        if self.page_cap == 0 || self.page_cap > PAGE_CAP {
            return Err(Error::config(
                format!("page_cap must be between 1 and {}", PAGE_CAP),
                "directory.page_cap",
            ));
        }
        if self.page_delay_max_secs < self.page_delay_min_secs {
            return Err(Error::config(
                "page_delay_max_secs must be greater than or equal to page_delay_min_secs",
                "pacing.page_delay_max_secs",
            ));
        }
        if self.fetch_retry.backoff_multiplier < 1.0 {
            return Err(Error::config(
                "backoff_multiplier must be at least 1.0",
                "fetch_retry.backoff_multiplier",
            ));
        }
        Ok(())
    }
}

/// Runs outreach against an injected directory and oracle
///
/// Cheap to clone; clones share the event channel and the active-run slot,
/// so at most one run is in flight across all of them.
#[derive(Clone)]
pub struct OutreachRunner {
    pub(crate) directory: Arc<dyn LeadDirectory>,
    pub(crate) oracle: Arc<dyn QualificationOracle>,
    pub(crate) settings: RunnerSettings,
    pub(crate) sleeper: Arc<dyn Sleeper>,
    event_tx: broadcast::Sender<Event>,
    active: Arc<Mutex<Option<CancellationToken>>>,
}

/// Clears the active-run slot when the run ends, however it ends
pub(crate) struct ActiveRun {
    slot: Arc<Mutex<Option<CancellationToken>>>,
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        *lock_slot(&self.slot) = None;
    }
}

fn lock_slot(
    slot: &Mutex<Option<CancellationToken>>,
) -> MutexGuard<'_, Option<CancellationToken>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl OutreachRunner {
    /// Create a runner with default settings and wall-clock pacing
    pub fn new(directory: Arc<dyn LeadDirectory>, oracle: Arc<dyn QualificationOracle>) -> Self {
        let (event_tx, _rx) = broadcast::channel(1000);
        Self {
            directory,
            oracle,
            settings: RunnerSettings::default(),
            sleeper: Arc::new(TokioSleeper),
            event_tx,
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Build the HTTP directory and Gemini oracle from service configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let directory = HttpLeadDirectory::new(&config.directory)?;
        let oracle = GeminiOracle::new(&config.oracle)?;

        tracing::info!(
            directory = directory.name(),
            oracle = oracle.name(),
            page_cap = config.directory.page_cap,
            fetch_retries = config.fetch_retry.max_attempts,
            "outreach runner initialized"
        );

        Ok(Self::new(Arc::new(directory), Arc::new(oracle))
            .with_settings(RunnerSettings::from_config(config)))
    }

    /// Replace the runner settings
    pub fn with_settings(mut self, settings: RunnerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Pace through `sleeper` instead of the wall clock
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Seed the pacing RNG
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.settings.seed = Some(seed);
        self
    }

    /// Choose what happens to rejected candidates
    pub fn with_unqualified_policy(mut self, policy: UnqualifiedPolicy) -> Self {
        self.settings.unqualified_policy = policy;
        self
    }

    /// Directory the runner acts on
    pub fn directory(&self) -> &Arc<dyn LeadDirectory> {
        &self.directory
    }

    /// Subscribe to run events
    ///
    /// Events emitted while nobody listens are dropped.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    /// True while a run is in flight
    pub fn is_running(&self) -> bool {
        lock_slot(&self.active).is_some()
    }

    /// Cancel the run in flight, if any
    ///
    /// Returns whether there was a run to cancel.
    pub fn cancel_current(&self) -> bool {
        match lock_slot(&self.active).as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub(crate) fn begin_run(&self, cancel: CancellationToken) -> Result<ActiveRun> {
        let mut slot = lock_slot(&self.active);
        if slot.is_some() {
            return Err(Error::RunInProgress);
        }
        *slot = Some(cancel);
        Ok(ActiveRun {
            slot: self.active.clone(),
        })
    }

    /// Run to completion, surfacing fatal errors
    ///
    /// Fails before any fetch when the request or the runner settings are
    /// invalid, the oracle is not configured, or another run is in flight.
    /// Everything that happens after the first fetch is reported in the
    /// returned [`RunResult`].
    pub async fn run(&self, config: RunConfig) -> Result<RunResult> {
        self.run_with_cancellation(config, CancellationToken::new())
            .await
    }

    /// Same as [`run`](Self::run), stopping early once `cancel` fires
    pub async fn run_with_cancellation(
        &self,
        config: RunConfig,
        cancel: CancellationToken,
    ) -> Result<RunResult> {
        if let Err(errors) = config.validate() {
            tracing::warn!(errors = %errors, "rejected outreach run request");
            return Err(errors.into());
        }

        self.settings.validate()?;
        self.oracle
            .ensure_ready()
            .map_err(|e| Error::config(e.to_string(), "oracle.api_key"))?;

        let _active = self.begin_run(cancel.clone())?;

        tracing::info!(
            lead_list_id = %config.lead_list_id,
            total_leads = config.total_leads,
            initial_start_count = config.initial_start_count,
            min_delay_secs = config.min_delay_secs,
            max_delay_secs = config.max_delay_secs,
            "starting outreach run"
        );

        Ok(self.drive(&config, &cancel).await)
    }

    /// Run to completion; fatal errors become a `success: false` result
    pub async fn run_automation(&self, config: RunConfig) -> RunResult {
        match self.run(config).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "outreach run could not start");
                failure_result(&e)
            }
        }
    }
}
