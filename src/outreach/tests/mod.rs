use super::*;
use crate::outreach::test_helpers::{
    RecordingSleeper, ScriptedDirectory, ScriptedOracle, candidate, page_of, pending,
};
use crate::types::{Page, RunOutcome};
use std::time::Duration;


const ACTION_DELAY: Duration = Duration::from_secs(10);

struct Harness {
    directory: Arc<ScriptedDirectory>,
    oracle: Arc<ScriptedOracle>,
    sleeper: Arc<RecordingSleeper>,
    runner: OutreachRunner,
}

impl Harness {
    fn new(directory: ScriptedDirectory, oracle: ScriptedOracle) -> Self {
        Self::with_settings(directory, oracle, RunnerSettings::default())
    }

    fn with_settings(
        directory: ScriptedDirectory,
        oracle: ScriptedOracle,
        settings: RunnerSettings,
    ) -> Self {
        let directory = Arc::new(directory);
        let oracle = Arc::new(oracle);
        let sleeper = Arc::new(RecordingSleeper::default());
        let runner = OutreachRunner::new(directory.clone(), oracle.clone())
            .with_settings(settings)
            .with_sleeper(sleeper.clone())
            .with_seed(7);
        Self {
            directory,
            oracle,
            sleeper,
            runner,
        }
    }

    /// Delays taken between candidates
    fn action_delays(&self) -> usize {
        self.sleeper
            .recorded()
            .iter()
            .filter(|d| **d == ACTION_DELAY)
            .count()
    }

    /// Delays taken between pages (always within 2..=5 seconds)
    fn page_delays(&self) -> usize {
        self.sleeper
            .recorded()
            .iter()
            .filter(|d| (2..=5).contains(&d.as_secs()))
            .count()
    }

    fn search_offsets(&self) -> Vec<(u32, u32)> {
        self.directory
            .searches()
            .into_iter()
            .map(|(offset, size, _)| (offset, size))
            .collect()
    }
}

/// Run request with fixed 10 second action delays
fn run_config(total_leads: u32) -> RunConfig {
    RunConfig::new(total_leads, "Hi {{firstName}}, {{companyName}}", "7371658687360155648")
}

fn settings_with_cap(page_cap: u32) -> RunnerSettings {
    RunnerSettings {
        page_cap,
        ..Default::default()
    }
}
