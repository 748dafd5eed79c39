//! Contact actions and the unqualified-candidate hook

use crate::directory::LeadDirectory;
use crate::error::DirectoryError;
use crate::types::{Ack, Candidate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What to do with a candidate the oracle rejected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnqualifiedPolicy {
    /// Leave the candidate on the lead list
    #[default]
    Keep,
    /// Remove the candidate from the lead list (best effort)
    RemoveFromList,
}

/// Performs the outbound side effects for one candidate
#[derive(Clone)]
pub struct Dispatcher {
    directory: Arc<dyn LeadDirectory>,
    policy: UnqualifiedPolicy,
}

impl Dispatcher {
    /// Dispatcher acting on `directory`
    pub fn new(directory: Arc<dyn LeadDirectory>, policy: UnqualifiedPolicy) -> Self {
        Self { directory, policy }
    }

    /// Send a connection request carrying `message`
    pub async fn dispatch(&self, candidate: &Candidate, message: &str) -> Result<Ack, DirectoryError> {
        self.directory.contact(&candidate.entity_urn, message).await
    }

    /// Apply the [`UnqualifiedPolicy`] to a rejected candidate
    ///
    /// Removal failures are logged and otherwise ignored.
    pub async fn handle_unqualified(&self, lead_list_id: &str, candidate: &Candidate) {
        if self.policy != UnqualifiedPolicy::RemoveFromList {
            return;
        }
        match self.directory.remove(lead_list_id, &candidate.entity_urn).await {
            Ok(_) => tracing::info!(
                person_id = %candidate.person_id,
                lead_list_id,
                "removed unqualified candidate from lead list"
            ),
            Err(e) => tracing::warn!(
                person_id = %candidate.person_id,
                lead_list_id,
                error = %e,
                "failed to remove unqualified candidate from lead list"
            ),
        }
    }
}
