//! Scripted doubles for the directory, the oracle and the sleeper.

use crate::directory::LeadDirectory;
use crate::error::{DirectoryError, OracleError};
use crate::oracle::QualificationOracle;
use crate::outreach::Sleeper;
use crate::types::{Ack, Candidate, OracleVerdict, Page, extract_person_id};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Candidate whose person id is `id`
pub(crate) fn candidate(id: &str) -> Candidate {
    Candidate {
        person_id: id.to_string(),
        entity_urn: format!("urn:li:fs_salesProfile:({},NAME_SEARCH,x)", id),
        full_name: format!("Lead {}", id),
        pending_invitation: false,
        profile: Default::default(),
    }
}

/// Same as [`candidate`] but already invited
pub(crate) fn pending(id: &str) -> Candidate {
    Candidate {
        pending_invitation: true,
        ..candidate(id)
    }
}

/// Page of `n` candidates named `{prefix}{i}`
pub(crate) fn page_of(prefix: &str, n: u32) -> Page {
    Page::new((0..n).map(|i| candidate(&format!("{}{}", prefix, i))).collect())
}

/// Lead directory replaying a fixed list of search responses
///
/// Once the script runs out every search returns an empty page.
#[derive(Default)]
pub(crate) struct ScriptedDirectory {
    pages: Mutex<VecDeque<Result<Page, DirectoryError>>>,
    searches: Mutex<Vec<(u32, u32, String)>>,
    contacts: Mutex<Vec<(String, String)>>,
    removals: Mutex<Vec<(String, String)>>,
    failing_contacts: HashSet<String>,
    failing_removals: bool,
    cancel_after_contacts: Option<(usize, CancellationToken)>,
}

impl ScriptedDirectory {
    pub(crate) fn new(pages: Vec<Page>) -> Self {
        Self::scripted(pages.into_iter().map(Ok).collect())
    }

    pub(crate) fn scripted(responses: Vec<Result<Page, DirectoryError>>) -> Self {
        Self {
            pages: Mutex::new(responses.into()),
            ..Default::default()
        }
    }

    /// Contact attempts for `person_id` fail with a rate limit
    pub(crate) fn failing_contact_for(mut self, person_id: &str) -> Self {
        self.failing_contacts.insert(person_id.to_string());
        self
    }

    pub(crate) fn failing_removals(mut self) -> Self {
        self.failing_removals = true;
        self
    }

    /// Fire `token` once `n` contact attempts have been made
    pub(crate) fn cancel_after_contacts(mut self, n: usize, token: CancellationToken) -> Self {
        self.cancel_after_contacts = Some((n, token));
        self
    }

    pub(crate) fn searches(&self) -> Vec<(u32, u32, String)> {
        self.searches.lock().unwrap().clone()
    }

    pub(crate) fn contacts(&self) -> Vec<(String, String)> {
        self.contacts.lock().unwrap().clone()
    }

    pub(crate) fn removals(&self) -> Vec<(String, String)> {
        self.removals.lock().unwrap().clone()
    }

    /// Person ids contacted, in order
    pub(crate) fn contacted_ids(&self) -> Vec<String> {
        self.contacts()
            .iter()
            .map(|(urn, _)| extract_person_id(urn).to_string())
            .collect()
    }
}

#[async_trait]
impl LeadDirectory for ScriptedDirectory {
    async fn search(&self, offset: u32, size: u32, lead_list_id: &str) -> Result<Page, DirectoryError> {
        self.searches
            .lock()
            .unwrap()
            .push((offset, size, lead_list_id.to_string()));
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Page::default()))
    }

    async fn contact(&self, candidate_ref: &str, message: &str) -> Result<Ack, DirectoryError> {
        let attempts = {
            let mut contacts = self.contacts.lock().unwrap();
            contacts.push((candidate_ref.to_string(), message.to_string()));
            contacts.len()
        };
        if let Some((n, token)) = &self.cancel_after_contacts {
            if attempts >= *n {
                token.cancel();
            }
        }
        if self.failing_contacts.contains(extract_person_id(candidate_ref)) {
            return Err(DirectoryError::RateLimited);
        }
        Ok(Ack::default())
    }

    async fn remove(&self, lead_list_id: &str, candidate_ref: &str) -> Result<Ack, DirectoryError> {
        self.removals
            .lock()
            .unwrap()
            .push((lead_list_id.to_string(), candidate_ref.to_string()));
        if self.failing_removals {
            return Err(DirectoryError::Upstream {
                status: 404,
                message: "entity not found".into(),
            });
        }
        Ok(Ack::default())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// One recorded oracle call
#[derive(Debug, Clone)]
pub(crate) struct OracleCall {
    pub(crate) person_id: String,
    pub(crate) template: String,
    pub(crate) target_industries: Option<String>,
    pub(crate) exclude_industries: Option<String>,
}

/// Oracle answering from a default verdict plus per-candidate overrides
#[derive(Default)]
pub(crate) struct ScriptedOracle {
    default_verdict: OracleVerdict,
    overrides: HashMap<String, OracleVerdict>,
    failures: HashSet<String>,
    missing_credentials: bool,
    calls: Mutex<Vec<OracleCall>>,
}

impl ScriptedOracle {
    pub(crate) fn always_qualified(message: &str) -> Self {
        Self {
            default_verdict: OracleVerdict {
                qualified: Some(true),
                outreach_message: Some(message.to_string()),
            },
            ..Default::default()
        }
    }

    pub(crate) fn never_qualified() -> Self {
        Self {
            default_verdict: OracleVerdict {
                qualified: Some(false),
                outreach_message: Some(String::new()),
            },
            ..Default::default()
        }
    }

    /// Qualifies everyone except `person_id`, for whom the call fails
    pub(crate) fn failing_for(person_id: &str) -> Self {
        Self::always_qualified("Hello").with_failure(person_id)
    }

    pub(crate) fn with_failure(mut self, person_id: &str) -> Self {
        self.failures.insert(person_id.to_string());
        self
    }

    pub(crate) fn with_verdict(mut self, person_id: &str, verdict: OracleVerdict) -> Self {
        self.overrides.insert(person_id.to_string(), verdict);
        self
    }

    pub(crate) fn without_credentials(mut self) -> Self {
        self.missing_credentials = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<OracleCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl QualificationOracle for ScriptedOracle {
    async fn generate(
        &self,
        template: &str,
        candidate: &Candidate,
        target_industries: Option<&str>,
        exclude_industries: Option<&str>,
    ) -> Result<OracleVerdict, OracleError> {
        self.calls.lock().unwrap().push(OracleCall {
            person_id: candidate.person_id.clone(),
            template: template.to_string(),
            target_industries: target_industries.map(str::to_string),
            exclude_industries: exclude_industries.map(str::to_string),
        });
        if self.failures.contains(&candidate.person_id) {
            return Err(OracleError::Transport("connection reset".into()));
        }
        Ok(self
            .overrides
            .get(&candidate.person_id)
            .cloned()
            .unwrap_or_else(|| self.default_verdict.clone()))
    }

    fn ensure_ready(&self) -> Result<(), OracleError> {
        if self.missing_credentials {
            Err(OracleError::MissingCredentials)
        } else {
            Ok(())
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Sleeper that records durations and returns immediately
#[derive(Default)]
pub(crate) struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub(crate) fn recorded(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}
