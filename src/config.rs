//! Configuration types for lead-outreach
//!
//! Two layers of configuration exist:
//! - [`Config`] is the service-level configuration (clients, pacing bounds,
//!   retry policy, API server). It is loaded once and shared.
//! - [`RunConfig`] describes a single outreach run. It arrives per request and
//!   is immutable for the lifetime of that run.

use crate::error::{Error, Result, ValidationErrors};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, net::SocketAddr, time::Duration};

/// Largest page the lead directory will serve in one search call
pub const PAGE_CAP: u32 = 100;

/// Main service configuration
///
/// Every section has sensible defaults, so `Config::default()` only needs an
/// oracle API key (or `GEMINI_API_KEY` in the environment) to be usable.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Lead directory client settings
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Qualification oracle client settings
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Inter-page pacing bounds
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Retry policy for lead directory page fetches
    #[serde(default)]
    pub fetch_retry: RetryConfig,

    /// REST API settings
    #[serde(default)]
    pub server: ApiConfig,
}

impl Config {
    /// Check cross-field invariants that serde defaults cannot express
    pub fn validate(&self) -> Result<()> {
        for (url, key) in [
            (&self.directory.base_url, "directory.base_url"),
            (&self.oracle.base_url, "oracle.base_url"),
        ] {
            url::Url::parse(url)
                .map_err(|e| Error::config(format!("invalid URL '{}': {}", url, e), key))?;
        }
        if self.directory.page_cap == 0 || self.directory.page_cap > PAGE_CAP {
            return Err(Error::config(
                format!("page_cap must be between 1 and {}", PAGE_CAP),
                "directory.page_cap",
            ));
        }
        if self.pacing.page_delay_max_secs < self.pacing.page_delay_min_secs {
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

/// Lead directory client configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Base URL of the directory API (default: "https://www.linkedin.com/sales-api")
    #[serde(default = "default_directory_base_url")]
    pub base_url: String,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_directory_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// Headers forwarded verbatim on every request
    ///
    /// Session material lives here; the client never inspects or refreshes it.
    #[serde(default)]
    pub extra_headers: HashMap<String, String>,

    /// Maximum candidates requested per page (default and upper bound: 100)
    #[serde(default = "default_page_cap")]
    pub page_cap: u32,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_directory_base_url(),
            timeout: default_directory_timeout(),
            extra_headers: HashMap::new(),
            page_cap: default_page_cap(),
        }
    }
}

/// Qualification oracle client configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Base URL of the generative API
    #[serde(default = "default_oracle_base_url")]
    pub base_url: String,

    /// Model identifier (default: "gemini-2.5-flash")
    #[serde(default = "default_oracle_model")]
    pub model: String,

    /// API key; falls back to `GEMINI_API_KEY` when unset
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout (default: 60 seconds)
    #[serde(default = "default_oracle_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: default_oracle_base_url(),
            model: default_oracle_model(),
            api_key: None,
            timeout: default_oracle_timeout(),
        }
    }
}

/// Pacing between page fetches
///
/// Pacing between contact actions is per run (see [`RunConfig`]).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Lower bound of the inter-page delay in seconds (default: 2)
    #[serde(default = "default_page_delay_min")]
    pub page_delay_min_secs: u64,

    /// Upper bound of the inter-page delay in seconds (default: 5)
    #[serde(default = "default_page_delay_max")]
    pub page_delay_max_secs: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            page_delay_min_secs: default_page_delay_min(),
            page_delay_max_secs: default_page_delay_max(),
        }
    }
}

/// Retry configuration for transient failures
///
/// The default performs no retries: a failed page fetch ends the run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (default: 0)
    #[serde(default)]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 60 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:3000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
        }
    }
}

/// Parameters of a single outreach run
///
/// Every field deserializes with a default so that a missing field surfaces
/// as a validation message rather than a decoding failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    /// How many candidates to process before stopping (at least 1)
    #[serde(default)]
    pub total_leads: u32,

    /// Message template handed to the qualification oracle
    #[serde(default)]
    pub message_template: String,

    /// Lead list to walk
    #[serde(default)]
    pub lead_list_id: String,

    /// Offset of the first page fetch (default: 0)
    #[serde(default)]
    pub initial_start_count: u32,

    /// Lower bound of the delay between contact actions, in seconds (default: 10)
    #[serde(default = "default_action_delay", rename = "minDelay")]
    pub min_delay_secs: u64,

    /// Upper bound of the delay between contact actions, in seconds (default: 10)
    #[serde(default = "default_action_delay", rename = "maxDelay")]
    pub max_delay_secs: u64,

    /// Free-text industries to target, passed to the oracle as-is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_industries: Option<String>,

    /// Free-text industries to exclude, passed to the oracle as-is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_industries: Option<String>,
}

impl RunConfig {
    /// Create a run request with default pacing and offset
    pub fn new(
        total_leads: u32,
        message_template: impl Into<String>,
        lead_list_id: impl Into<String>,
    ) -> Self {
        Self {
            total_leads,
            message_template: message_template.into(),
            lead_list_id: lead_list_id.into(),
            initial_start_count: 0,
            min_delay_secs: default_action_delay(),
            max_delay_secs: default_action_delay(),
            target_industries: None,
            exclude_industries: None,
        }
    }

    /// Collect every field violation
    pub fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.total_leads < 1 {
            errors.push("totalLeads", "Total leads must be at least 1");
        }
        if self.message_template.is_empty() {
            errors.push("messageTemplate", "Message template is required");
        }
        if self.lead_list_id.is_empty() {
            errors.push("leadListId", "Lead list ID is required");
        }
        if self.min_delay_secs < 1 {
            errors.push("minDelay", "Min delay must be at least 1 second");
        }
        if self.max_delay_secs < 1 {
            errors.push("maxDelay", "Max delay must be at least 1 second");
        }
        if self.max_delay_secs < self.min_delay_secs {
            errors.push(
                "maxDelay",
                "Max delay must be greater than or equal to min delay",
            );
        }
        errors.into_result()
    }
}

fn default_directory_base_url() -> String {
    "https://www.linkedin.com/sales-api".to_string()
}

fn default_directory_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_page_cap() -> u32 {
    PAGE_CAP
}

fn default_oracle_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_oracle_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_oracle_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_page_delay_min() -> u64 {
    2
}

fn default_page_delay_max() -> u64 {
    5
}

fn default_action_delay() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
