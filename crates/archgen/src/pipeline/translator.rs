//! Source code to pseudocode translation.
//!
//! [`Translator`] is the seam the orchestrator calls; [`AnthropicTranslator`]
//! is a thin blocking HTTP wrapper around the Anthropic Messages API with the
//! response parsing kept in a pure function for testability.

use std::time::Duration;

use tracing::{error, info};

use crate::core::PipelineError;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
const MAX_TOKENS: u32 = 1500;
const TEMPERATURE: f32 = 0.5;
const REQUEST_TIMEOUT_SECS: u64 = 120;
const CONNECT_TIMEOUT_SECS: u64 = 10;

const PROMPT_PREAMBLE: &str = "Translate the following code into pseudocode, focusing on \
important function calls and database interactions. Use a fixed format:";

/// Turns arbitrary source code into pseudocode text
pub trait Translator: Send + Sync {
    fn translate(&self, source_code: &str) -> Result<String, PipelineError>;
}

/// Build the user prompt sent to the model
pub fn build_prompt(source_code: &str) -> String {
    format!("{PROMPT_PREAMBLE}\n\n{source_code}")
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct AnthropicTranslator {
    http: reqwest::blocking::Client,
    api_key: String,
    model: String,
    api_url: String,
}

impl AnthropicTranslator {
    pub fn new(api_key: impl Into<String>) -> Result<Self, PipelineError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(PipelineError::config("translator API key is not set"));
        }
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| PipelineError::translate(format!("HTTP client build failed: {e}")))?;
        Ok(Self {
            http,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            api_url: API_URL.to_string(),
        })
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different endpoint (proxies, test servers)
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Translator for AnthropicTranslator {
    fn translate(&self, source_code: &str) -> Result<String, PipelineError> {
        let prompt = build_prompt(source_code);
        let body = ApiRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            messages: [ApiMessage {
                role: "user",
                content: &prompt,
            }],
        };

        let response = self
            .http
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .map_err(|e| {
                error!(error = %e, "LLM API request error");
                PipelineError::translate(e)
            })?;

        let status = response.status().as_u16();
        let text = response.text().map_err(PipelineError::translate)?;

        if status != 200 {
            error!(status, "LLM API returned an error status");
            return Err(PipelineError::Api { status, body: text });
        }

        let pseudocode = parse_response(&text)?;
        info!(output_len = pseudocode.len(), "Pseudocode generation successful");
        Ok(pseudocode)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [ApiMessage<'a>; 1],
}

#[derive(serde::Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(serde::Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Unknown,
}

// =============================================================================
// PARSING
// =============================================================================

/// Extract the pseudocode text from a Messages API response body
///
/// Text blocks are concatenated in order; other block types are ignored.
/// A response with no text is an error.
pub fn parse_response(json: &str) -> Result<String, PipelineError> {
    let api: ApiResponse = serde_json::from_str(json)
        .map_err(|e| PipelineError::translate(format!("malformed API response: {e}")))?;

    let text: String = api
        .content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Unknown => None,
        })
        .collect();

    if text.trim().is_empty() {
        return Err(PipelineError::translate("No pseudocode generated"));
    }
    Ok(text)
}
