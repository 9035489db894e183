//! Anthropic Messages API client

use super::prompt::{assistant_prefill, build_user_prompt, SYSTEM_PROMPT};
use super::ReportGenerator;
use crate::{Error, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";
pub const DEFAULT_MAX_TOKENS: u32 = 4000;
const API_VERSION: &str = "2023-06-01";
const USER_AGENT: &str = concat!("journallm/", env!("CARGO_PKG_VERSION"));

/// Everything needed to build a client except the credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    /// Whole-request timeout; generation routinely takes a minute or more
    pub timeout: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

/// Messages API client
pub struct AnthropicClient {
    http_client: reqwest::Client,
    api_key: String,
    settings: GenerationSettings,
}

impl fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("api_key", &"<redacted>")
            .field("settings", &self.settings)
            .finish()
    }
}

impl AnthropicClient {
    /// Build a client; the key must be non-blank
    pub fn new(api_key: impl Into<String>, settings: GenerationSettings) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::MissingCredential);
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            api_key: api_key.trim().to_string(),
            settings,
        })
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.settings.base_url.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl ReportGenerator for AnthropicClient {
    async fn generate(&self, journal_xml: &str) -> Result<String> {
        let user_prompt = build_user_prompt(journal_xml);
        let prefill = assistant_prefill(Local::now());

        debug!(
            system_chars = SYSTEM_PROMPT.len(),
            user_chars = user_prompt.len(),
            model = %self.settings.model,
            "Sending generation request"
        );
        info!("Waiting for the generation service (this may take a minute)");

        let request = MessagesRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            system: SYSTEM_PROMPT,
            messages: vec![
                Message { role: "user", content: &user_prompt },
                Message { role: "assistant", content: &prefill },
            ],
        };

        let response = self
            .http_client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::GenerationServiceFailure(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|env| format!("{}: {}", env.error.kind, env.error.message))
                .unwrap_or(body);
            return Err(Error::GenerationServiceFailure(format!(
                "HTTP {}: {}",
                status.as_u16(),
                message
            )));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| Error::GenerationServiceFailure(format!("invalid response: {e}")))?;

        if let Some(usage) = &body.usage {
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Token usage"
            );
        }

        let text: String = body
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text.as_str())
            .collect();

        if text.trim().is_empty() {
            return Err(Error::GenerationServiceFailure(
                "response contained no text".to_string(),
            ));
        }

        let report = prefill + &text;
        debug!(chars = report.len(), "Report generated");
        Ok(report)
    }
}
