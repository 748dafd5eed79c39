//! Randomized delays between contact actions and between pages

use crate::config::RunConfig;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Suspends the calling task
///
/// Production uses [`TokioSleeper`]; tests record requested durations instead
/// of waiting.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Wall-clock sleeper backed by `tokio::time::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Samples delays and waits through a [`Sleeper`]
pub struct Pacer {
    rng: StdRng,
    sleeper: Arc<dyn Sleeper>,
    page_delay_min_secs: u64,
    page_delay_max_secs: u64,
}

impl Pacer {
    /// Build a pacer; `seed` makes the delay sequence reproducible
    ///
    /// Delay bounds are accepted in either order.
    pub fn new(
        sleeper: Arc<dyn Sleeper>,
        seed: Option<u64>,
        page_delay_min_secs: u64,
        page_delay_max_secs: u64,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            sleeper,
            page_delay_min_secs,
            page_delay_max_secs,
        }
    }

    fn uniform_secs(&mut self, a: u64, b: u64) -> Duration {
        let (low, high) = (a.min(b), a.max(b));
        Duration::from_secs(self.rng.gen_range(low..=high))
    }

    /// Whole seconds in `[min_delay_secs, max_delay_secs]`
    pub fn action_delay(&mut self, config: &RunConfig) -> Duration {
        self.uniform_secs(config.min_delay_secs, config.max_delay_secs)
    }

    /// Whole seconds in the configured page range
    pub fn page_delay(&mut self) -> Duration {
        self.uniform_secs(self.page_delay_min_secs, self.page_delay_max_secs)
    }

    /// Sleep for `duration` unless `cancel` fires first
    ///
    /// Returns false when the wait was cut short by cancellation.
    pub async fn wait(&self, duration: Duration, cancel: &CancellationToken) -> bool {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            _ = self.sleeper.sleep(duration) => true,
        }
    }
}
