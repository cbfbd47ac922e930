//! LLM providers for document summaries.
//!
//! Anthropic, OpenAI and OpenRouter are reached through one blocking HTTP
//! client. OpenAI and OpenRouter share the Chat Completions wire format;
//! Anthropic uses the Messages API.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use super::SummarizeError;

/// Timeout for establishing a connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the entire request including response.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Upper bound on generated tokens.
const MAX_TOKENS: u32 = 1024;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Supported LLM provider kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryProviderKind {
    Anthropic,
    OpenAI,
    OpenRouter,
}

impl SummaryProviderKind {
    fn endpoint(self) -> &'static str {
        match self {
            SummaryProviderKind::Anthropic => "https://api.anthropic.com/v1/messages",
            SummaryProviderKind::OpenAI => "https://api.openai.com/v1/chat/completions",
            SummaryProviderKind::OpenRouter => "https://openrouter.ai/api/v1/chat/completions",
        }
    }
}

impl fmt::Display for SummaryProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryProviderKind::Anthropic => write!(f, "anthropic"),
            SummaryProviderKind::OpenAI => write!(f, "openai"),
            SummaryProviderKind::OpenRouter => write!(f, "openrouter"),
        }
    }
}

impl FromStr for SummaryProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" => Ok(SummaryProviderKind::Anthropic),
            "openai" => Ok(SummaryProviderKind::OpenAI),
            "openrouter" => Ok(SummaryProviderKind::OpenRouter),
            other => Err(format!(
                "Unknown summary provider: '{other}'. Expected one of: anthropic, openai, openrouter"
            )),
        }
    }
}

/// Trait for LLM providers that can generate summaries.
pub trait SummaryProvider {
    /// Sends the instructions and the document text, returning the raw reply.
    fn summarize(&self, system_prompt: &str, user_content: &str) -> Result<String, SummarizeError>;

    /// Human-readable `kind/model` label for logs.
    fn describe(&self) -> String;
}

/// A provider reached over HTTPS.
pub struct HttpProvider {
    kind: SummaryProviderKind,
    client: Client,
    api_key: String,
    model: String,
}

impl HttpProvider {
    fn build_request_body(&self, system_prompt: &str, user_content: &str) -> Value {
        match self.kind {
            SummaryProviderKind::Anthropic => serde_json::json!({
                "model": self.model,
                "max_tokens": MAX_TOKENS,
                "system": system_prompt,
                "messages": [
                    { "role": "user", "content": user_content }
                ]
            }),
            SummaryProviderKind::OpenAI | SummaryProviderKind::OpenRouter => serde_json::json!({
                "model": self.model,
                "max_tokens": MAX_TOKENS,
                "messages": [
                    { "role": "system", "content": system_prompt },
                    { "role": "user", "content": user_content }
                ]
            }),
        }
    }

    fn parse_response(&self, json: &Value) -> Result<String, SummarizeError> {
        match self.kind {
            SummaryProviderKind::Anthropic => parse_anthropic_response(json),
            SummaryProviderKind::OpenAI | SummaryProviderKind::OpenRouter => {
                parse_chat_completion_response(json)
            }
        }
    }
}

impl SummaryProvider for HttpProvider {
    fn summarize(&self, system_prompt: &str, user_content: &str) -> Result<String, SummarizeError> {
        let body = self.build_request_body(system_prompt, user_content);

        let request = self
            .client
            .post(self.kind.endpoint())
            .header("content-type", "application/json");
        let request = match self.kind {
            SummaryProviderKind::Anthropic => request
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION),
            SummaryProviderKind::OpenAI => request.bearer_auth(&self.api_key),
            SummaryProviderKind::OpenRouter => request
                .bearer_auth(&self.api_key)
                .header("X-Title", "docbrief"),
        };

        let response = request
            .json(&body)
            .send()
            .map_err(|e| SummarizeError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SummarizeError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = response
            .json()
            .map_err(|e| SummarizeError::ParseError(e.to_string()))?;

        self.parse_response(&json)
    }

    fn describe(&self) -> String {
        format!("{}/{}", self.kind, self.model)
    }
}

/// Extracts `content[0].text` from an Anthropic Messages response.
fn parse_anthropic_response(json: &Value) -> Result<String, SummarizeError> {
    json.get("content")
        .and_then(|c| c.as_array())
        .and_then(|blocks| {
            blocks
                .iter()
                .find(|b| b.get("type").and_then(|t| t.as_str()).unwrap_or("text") == "text")
        })
        .and_then(|block| block.get("text"))
        .and_then(|t| t.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            SummarizeError::ParseError("Missing content[0].text in Anthropic response".to_string())
        })
}

/// Extracts `choices[0].message.content` from a Chat Completions response.
fn parse_chat_completion_response(json: &Value) -> Result<String, SummarizeError> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            SummarizeError::ParseError("Missing choices[0].message.content in response".to_string())
        })
}

/// Returns the default model for the given provider kind.
pub fn default_model(kind: SummaryProviderKind) -> &'static str {
    match kind {
        SummaryProviderKind::Anthropic => "claude-haiku-4-5",
        SummaryProviderKind::OpenAI => "gpt-4o-mini",
        SummaryProviderKind::OpenRouter => "meta-llama/llama-3.1-8b-instruct:free",
    }
}

/// Creates a summary provider for the given kind.
///
/// If `model` is `None`, uses the default model for the provider kind.
pub fn create_provider(
    kind: SummaryProviderKind,
    api_key: String,
    model: Option<String>,
) -> Result<HttpProvider, SummarizeError> {
    let client = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| SummarizeError::RequestFailed(format!("Failed to build HTTP client: {e}")))?;

    Ok(HttpProvider {
        kind,
        client,
        api_key,
        model: model.unwrap_or_else(|| default_model(kind).to_string()),
    })
}
