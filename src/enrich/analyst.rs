//! Language-model client used for structured enrichment.
//!
//! # Architecture
//!
//! - [`Analyst`]: Core trait defining one system+user exchange with a model
//! - [`OpenAiAnalyst`]: Chat Completions implementation over `reqwest`
//!
//! Requests are not retried. A failed exchange sends the whole run down the
//! fallback template.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Timeout for one analysis request.
pub const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(40);
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const TEMPERATURE: f32 = 0.2;

/// Everything that can go wrong between sending the selection and holding a
/// validated payload.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("analysis service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("analysis reply had no content")]
    EmptyReply,

    #[error("analysis reply is not the expected JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected {expected} items, got {got}")]
    ItemCount { expected: usize, got: usize },

    #[error("invalid field in analysis reply: {0}")]
    InvalidField(String),
}

/// Trait for a single model exchange.
///
/// Implementors send a system instruction and a user message and return the
/// raw text of the reply.
pub trait Analyst {
    async fn ask(&self, system: &str, user: &str) -> Result<String, AnalysisError>;
}

/// OpenAI-compatible Chat Completions client.
pub struct OpenAiAnalyst {
    http: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl fmt::Debug for OpenAiAnalyst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiAnalyst")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl OpenAiAnalyst {
    /// Build a client for `{base_url}/chat/completions`.
    pub fn new(api_key: &str, model: &str, base_url: &str) -> Result<Self, AnalysisError> {
        let http = Client::builder().timeout(ANALYSIS_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl Analyst for OpenAiAnalyst {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn ask(&self, system: &str, user: &str) -> Result<String, AnalysisError> {
        let t0 = Instant::now();
        let request = ChatRequest {
            model: &self.model,
            temperature: TEMPERATURE,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Analysis request rejected"
            );
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body: crate::utils::truncate_for_log(&body, 300),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(AnalysisError::EmptyReply)?;

        info!(
            bytes = content.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Analysis reply received"
        );
        Ok(content)
    }
}
