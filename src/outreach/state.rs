//! Mutable bookkeeping for a single run

use crate::error::Error;
use crate::types::{ItemError, RunOutcome, RunResult};
use chrono::{DateTime, Utc};

/// Counters and cursor owned by the orchestrator for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    /// Offset of the next page fetch
    pub cursor: u32,
    /// Candidates acted on
    pub processed: u32,
    /// Successful contact actions
    pub sent: u32,
    /// Candidates excluded for a pending invitation
    pub skipped: u32,
    /// Candidates the oracle rejected
    pub unqualified: u32,
    /// Per-candidate failures in encounter order
    pub errors: Vec<ItemError>,
    /// Search calls that returned a page
    pub pages_fetched: u32,
}

impl RunState {
    /// Fresh state starting at `initial_start_count`
    pub fn new(initial_start_count: u32) -> Self {
        Self {
            cursor: initial_start_count,
            ..Default::default()
        }
    }

    /// True once `processed` has reached `total_leads`
    pub fn target_reached(&self, total_leads: u32) -> bool {
        self.processed >= total_leads
    }

    /// A contact action went through
    pub fn record_sent(&mut self) {
        self.sent += 1;
        self.processed += 1;
    }

    /// The oracle turned the candidate down
    pub fn record_unqualified(&mut self) {
        self.unqualified += 1;
        self.processed += 1;
    }

    /// Qualification or dispatch failed for one candidate
    ///
    /// Counted in `processed` only.
    pub fn record_failure(&mut self, person_id: impl Into<String>, error: impl Into<String>) {
        self.errors.push(ItemError {
            person_id: person_id.into(),
            error: error.into(),
        });
        self.processed += 1;
    }

    fn counters(&self) -> String {
        format!(
            "Processed {} leads, sent {} invitations, skipped {} leads, unqualified {} leads.",
            self.processed, self.sent, self.skipped, self.unqualified
        )
    }

    /// Human-readable summary for the final report
    pub fn summary(&self, outcome: &RunOutcome) -> String {
        match outcome {
            RunOutcome::Completed => {
                format!("Automation completed successfully. {}", self.counters())
            }
            RunOutcome::Aborted { reason } => {
                format!("Automation stopped early ({}). {}", reason, self.counters())
            }
            RunOutcome::Cancelled => format!("Automation cancelled. {}", self.counters()),
        }
    }

    /// Final report; every outcome that got past validation is a success
    pub fn into_result(self, outcome: RunOutcome, started_at: DateTime<Utc>) -> RunResult {
        RunResult {
            success: true,
            message: self.summary(&outcome),
            processed: self.processed,
            sent: self.sent,
            skipped: self.skipped,
            unqualified: self.unqualified,
            errors: self.errors,
            outcome: Some(outcome),
            next_start: self.cursor,
            started_at: Some(started_at),
            finished_at: Some(Utc::now()),
        }
    }
}

/// Fold a fatal error into a `success: false` report
pub fn failure_result(error: &Error) -> RunResult {
    match error {
        Error::Validation(v) => RunResult::failed("Invalid request parameters", v.joined()),
        Error::Config { message, .. } => {
            RunResult::failed("Automation is not configured correctly", message.clone())
        }
        other => RunResult::failed(other.to_string(), other.to_string()),
    }
}
