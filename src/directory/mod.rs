//! Lead directory access
//!
//! The orchestrator only ever talks to a [`LeadDirectory`]. The crate ships
//! one implementation over HTTP ([`HttpLeadDirectory`]); tests substitute
//! scripted doubles.

use crate::error::DirectoryError;
use crate::types::{Ack, Page};
use async_trait::async_trait;

mod http;

pub use http::HttpLeadDirectory;

/// Paged access to a lead list plus the outbound actions on its members
///
/// A single handle is reused for a whole run, so implementations must be
/// cheap to share (`Send + Sync`).
#[async_trait]
pub trait LeadDirectory: Send + Sync {
    /// Fetch `size` candidates of `lead_list_id` starting at `offset`
    async fn search(
        &self,
        offset: u32,
        size: u32,
        lead_list_id: &str,
    ) -> Result<Page, DirectoryError>;

    /// Send a connection request carrying `message` to the candidate behind `candidate_ref`
    async fn contact(&self, candidate_ref: &str, message: &str) -> Result<Ack, DirectoryError>;

    /// Remove the candidate behind `candidate_ref` from `lead_list_id`
    ///
    /// Optional capability; the default reports [`DirectoryError::Unsupported`].
    async fn remove(
        &self,
        _lead_list_id: &str,
        _candidate_ref: &str,
    ) -> Result<Ack, DirectoryError> {
        Err(DirectoryError::Unsupported)
    }

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
