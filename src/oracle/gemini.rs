//! Gemini-backed qualification oracle

use super::QualificationOracle;
use super::prompt::build_outreach_prompt;
use crate::config::OracleConfig;
use crate::error::{OracleError, Result};
use crate::types::{Candidate, OracleVerdict};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Qualification oracle calling the Gemini `generateContent` endpoint
///
/// The model is asked for a JSON answer constrained by a response schema, so
/// the text part of the reply decodes straight into an [`OracleVerdict`].
#[derive(Debug, Clone)]
pub struct GeminiOracle {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if any
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

fn verdict_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "qualified": { "type": "BOOLEAN" },
            "outreachMessage": { "type": "STRING" }
        },
        "required": ["qualified", "outreachMessage"]
    })
}

impl GeminiOracle {
    /// Build an oracle from configuration, falling back to `GEMINI_API_KEY`
    pub fn new(config: &OracleConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok());
        Self::with_api_key(config, api_key)
    }

    /// Build an oracle with an explicit key, ignoring the environment
    pub fn with_api_key(config: &OracleConfig, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl QualificationOracle for GeminiOracle {
    async fn generate(
        &self,
        template: &str,
        candidate: &Candidate,
        target_industries: Option<&str>,
        exclude_industries: Option<&str>,
    ) -> std::result::Result<OracleVerdict, OracleError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(OracleError::MissingCredentials)?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: build_outreach_prompt(
                        template,
                        candidate,
                        target_industries,
                        exclude_industries,
                    ),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: verdict_schema(),
            },
        };

        tracing::debug!(
            model = %self.model,
            person_id = %candidate.person_id,
            "requesting qualification verdict"
        );

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(status = status.as_u16(), "oracle returned error status");
            return Err(OracleError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Parse(format!("invalid response body: {}", e)))?;

        let text = body.first_text().unwrap_or("{}");
        serde_json::from_str(text).map_err(|e| OracleError::Parse(e.to_string()))
    }

    fn ensure_ready(&self) -> std::result::Result<(), OracleError> {
        match self.api_key {
            Some(_) => Ok(()),
            None => Err(OracleError::MissingCredentials),
        }
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
