//! Core types for lead-outreach

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Prefix of the entity reference that embeds a person identifier
const SALES_PROFILE_URN_PREFIX: &str = "urn:li:fs_salesProfile:(";

/// Extract the person identifier embedded in a sales profile URN
///
/// `urn:li:fs_salesProfile:(ACwAAAFRRiUB,NAME_SEARCH,pzxc)` yields `ACwAAAFRRiUB`.
/// Anything that does not match that shape yields an empty string.
///
/// ```
/// use lead_outreach::types::extract_person_id;
///
/// assert_eq!(extract_person_id("urn:li:fs_salesProfile:(ACw123,NAME_SEARCH,x)"), "ACw123");
/// assert_eq!(extract_person_id("urn:li:member:22103589"), "");
/// ```
pub fn extract_person_id(entity_urn: &str) -> &str {
    entity_urn
        .strip_prefix(SALES_PROFILE_URN_PREFIX)
        .and_then(|rest| rest.split_once(','))
        .map(|(id, _)| id)
        .filter(|id| !id.is_empty())
        .unwrap_or("")
}

/// A lead as returned by the directory
///
/// Owned by the page that produced it and read-only for the rest of the run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Person identifier (derived from `entity_urn` when the directory omits it)
    #[serde(default, deserialize_with = "lenient")]
    pub person_id: String,

    /// Opaque directory reference used for contact and removal
    pub entity_urn: String,

    /// Display name
    #[serde(default, deserialize_with = "lenient")]
    pub full_name: String,

    /// Already invited or otherwise awaiting a response
    #[serde(default, deserialize_with = "lenient")]
    pub pending_invitation: bool,

    /// Every other attribute, handed to the oracle verbatim
    #[serde(flatten)]
    pub profile: CandidateProfile,
}

impl Candidate {
    /// Fill `person_id` from `entity_urn` when it is missing
    pub fn with_person_id_backfilled(mut self) -> Self {
        if self.person_id.is_empty() {
            self.person_id = extract_person_id(&self.entity_urn).to_string();
        }
        self
    }
}

/// Profile attributes as the directory sent them
///
/// Kept opaque so that unexpected shapes never fail a page decode and the
/// oracle sees every attribute verbatim.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateProfile(serde_json::Map<String, serde_json::Value>);

impl CandidateProfile {
    /// Raw attribute value
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Attribute value when it is a string
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    /// Set an attribute, returning the profile
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Every attribute
    pub fn as_map(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.0
    }
}

/// Decode `T`, falling back to its default when the value is null or has
/// another shape
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Paging metadata of a search response
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    /// Total matches in the list
    #[serde(default)]
    pub total: u32,
    /// Elements in this page
    #[serde(default)]
    pub count: u32,
    /// Offset of this page
    #[serde(default)]
    pub start: u32,
}

/// One page of search results
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Candidates in directory order
    #[serde(default)]
    pub elements: Vec<Candidate>,

    /// Paging metadata, when the directory provides it in a usable shape
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub paging: Option<Paging>,
}

impl Page {
    /// Build a page from candidates alone
    pub fn new(elements: Vec<Candidate>) -> Self {
        Self {
            elements,
            paging: None,
        }
    }

    /// Number of elements received
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True when the directory returned nothing
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Raw oracle answer; either field may be missing
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleVerdict {
    /// Whether the candidate should be contacted
    #[serde(default)]
    pub qualified: Option<bool>,

    /// Composed message
    #[serde(default, rename = "outreachMessage", alias = "message")]
    pub outreach_message: Option<String>,
}

/// Normalized qualification outcome for one candidate
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationResult {
    /// Whether to contact the candidate
    pub qualified: bool,
    /// Message to send; empty when not qualified
    pub message: String,
}

/// Acknowledgement of a directory action
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    /// Raw response body, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

/// A failure recorded against a single candidate
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemError {
    /// Candidate the failure belongs to (empty for run-level failures)
    pub person_id: String,
    /// What went wrong
    pub error: String,
}

/// How a run ended
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Target reached or the lead list ran out
    Completed,
    /// A page fetch failed and the run stopped early
    Aborted {
        /// The fetch failure
        reason: String,
    },
    /// The run was cancelled from outside
    Cancelled,
}

/// Final report of a run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    /// False only when the run could not start
    pub success: bool,

    /// Human-readable summary
    pub message: String,

    /// Candidates acted on (qualified, rejected, or failed)
    #[serde(rename = "processedLeads")]
    pub processed: u32,

    /// Contact actions that succeeded
    #[serde(rename = "sentInvitations")]
    pub sent: u32,

    /// Candidates excluded for a pending invitation
    #[serde(rename = "skippedLeads")]
    pub skipped: u32,

    /// Candidates the oracle rejected
    #[serde(rename = "unqualifiedLeads")]
    pub unqualified: u32,

    /// Per-candidate failures in encounter order
    pub errors: Vec<ItemError>,

    /// How the run ended; absent when it never started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RunOutcome>,

    /// Offset the next run should start from
    #[serde(default)]
    pub next_start: u32,

    /// When the run started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When the run finished
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunResult {
    /// Result for a run that failed before its first fetch
    pub fn failed(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            processed: 0,
            sent: 0,
            skipped: 0,
            unqualified: 0,
            errors: vec![ItemError {
                person_id: String::new(),
                error: error.into(),
            }],
            outcome: None,
            next_start: 0,
            started_at: None,
            finished_at: None,
        }
    }
}

/// Events emitted while a run progresses
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A run passed validation and is about to fetch
    RunStarted {
        /// Lead list being walked
        lead_list_id: String,
        /// Target number of candidates
        total_leads: u32,
        /// First offset
        start: u32,
    },

    /// A page came back from the directory
    PageFetched {
        /// Offset requested
        offset: u32,
        /// Size requested
        requested: u32,
        /// Elements received
        received: u32,
        /// Elements left after filtering
        available: u32,
    },

    /// A contact action succeeded
    InvitationSent {
        /// Candidate contacted
        person_id: String,
    },

    /// The oracle rejected a candidate
    CandidateUnqualified {
        /// Candidate rejected
        person_id: String,
    },

    /// Qualification or dispatch failed for a candidate
    CandidateFailed {
        /// Candidate affected
        person_id: String,
        /// Failure message
        error: String,
    },

    /// The run ended
    RunFinished {
        /// How it ended
        outcome: RunOutcome,
        /// Final processed count
        processed: u32,
        /// Final sent count
        sent: u32,
    },
}

impl Event {
    /// Short name used as the SSE event type
    pub fn kind(&self) -> &'static str {
        match self {
            Event::RunStarted { .. } => "run_started",
            Event::PageFetched { .. } => "page_fetched",
            Event::InvitationSent { .. } => "invitation_sent",
            Event::CandidateUnqualified { .. } => "candidate_unqualified",
            Event::CandidateFailed { .. } => "candidate_failed",
            Event::RunFinished { .. } => "run_finished",
        }
    }
}
