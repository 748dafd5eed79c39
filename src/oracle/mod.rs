//! Qualification oracle access
//!
//! The oracle decides whether a candidate is worth contacting and composes the
//! message to send. The orchestrator only sees [`QualificationOracle`];
//! [`GeminiOracle`] is the shipped implementation.

use crate::error::OracleError;
use crate::types::{Candidate, OracleVerdict};
use async_trait::async_trait;

mod gemini;
pub mod prompt;

pub use gemini::GeminiOracle;

/// Judges candidates and writes outreach messages
#[async_trait]
pub trait QualificationOracle: Send + Sync {
    /// Ask for a verdict on `candidate` given the run's template and industry filters
    ///
    /// The returned verdict may be partial; normalization happens in the caller.
    async fn generate(
        &self,
        template: &str,
        candidate: &Candidate,
        target_industries: Option<&str>,
        exclude_industries: Option<&str>,
    ) -> Result<OracleVerdict, OracleError>;

    /// Check that the oracle can be called at all (credentials present)
    ///
    /// Called once before a run starts.
    fn ensure_ready(&self) -> Result<(), OracleError> {
        Ok(())
    }

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
