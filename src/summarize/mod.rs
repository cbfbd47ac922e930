//! Document summary generation.
//!
//! A [`Summarizer`] turns extracted text into a short brief. When an LLM
//! provider is configured, [`ProviderSummarizer`] sends the (truncated)
//! document to it; any failure falls back to [`FallbackSummarizer`], which
//! builds a summary locally from the leading sentences and the keywords.
//!
//! Provider settings come from the config file with environment variable
//! overrides, see [`resolve_config`].

pub mod prompt;
pub mod provider;

use std::env;

use crate::config::Config;
use crate::storage::SummarySource;

pub use provider::{create_provider, default_model, HttpProvider, SummaryProvider, SummaryProviderKind};

/// Summary text used when a document has no extractable text.
pub const EMPTY_DOCUMENT_SUMMARY: &str = "No text could be extracted from this document.";

/// Character budget of a locally built summary, keywords excluded.
const FALLBACK_SUMMARY_CHARS: usize = 400;

/// Sentences kept in a locally built summary.
const FALLBACK_SENTENCES: usize = 3;

/// Resolved provider configuration.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    pub kind: SummaryProviderKind,
    pub api_key: String,
    /// Optional model override (uses provider default if None).
    pub model: Option<String>,
}

/// Resolves provider configuration.
///
/// Environment variables take precedence over config file values:
/// - `DOCBRIEF_SUMMARY_PROVIDER` overrides `summary_provider`
/// - `DOCBRIEF_SUMMARY_API_KEY` overrides the provider API key
/// - `DOCBRIEF_SUMMARY_MODEL` overrides the provider model
///
/// Returns `NotConfigured` if no provider or API key is set.
pub fn resolve_config(config: &Config) -> Result<SummaryConfig, SummarizeError> {
    let provider_str = non_empty_env("DOCBRIEF_SUMMARY_PROVIDER")
        .or_else(|| config.summary_provider.clone())
        .ok_or(SummarizeError::NotConfigured)?;

    let kind: SummaryProviderKind = provider_str
        .parse()
        .map_err(|_| SummarizeError::NotConfigured)?;

    let api_key = non_empty_env("DOCBRIEF_SUMMARY_API_KEY")
        .or_else(|| config.summary_api_key_for_provider(&provider_str))
        .filter(|key| !key.trim().is_empty())
        .ok_or(SummarizeError::NotConfigured)?;

    let model = non_empty_env("DOCBRIEF_SUMMARY_MODEL")
        .or_else(|| config.summary_model_for_provider(&provider_str));

    Ok(SummaryConfig {
        kind,
        api_key,
        model,
    })
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// A generated summary and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub text: String,
    pub source: SummarySource,
}

/// Produces a summary for a document's text.
///
/// Implementations never fail: they degrade to a locally built summary.
pub trait Summarizer {
    fn summarize(&self, filename: &str, text: &str, keywords: &[String]) -> Summary;
}

/// Builds the summarizer for `config`: provider-backed when configured,
/// local otherwise.
pub fn build_summarizer(config: &Config) -> Box<dyn Summarizer> {
    let resolved = match resolve_config(config) {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::debug!("Using local summaries: {}", e);
            return Box::new(FallbackSummarizer);
        }
    };

    match create_provider(resolved.kind, resolved.api_key, resolved.model) {
        Ok(provider) => Box::new(ProviderSummarizer::new(
            Box::new(provider),
            config.max_summary_chars,
        )),
        Err(e) => {
            tracing::warn!("Summary provider unavailable, using local summaries: {}", e);
            Box::new(FallbackSummarizer)
        }
    }
}

/// Summarizes with an LLM provider, falling back locally on error.
pub struct ProviderSummarizer {
    provider: Box<dyn SummaryProvider>,
    max_chars: usize,
}

impl ProviderSummarizer {
    pub fn new(provider: Box<dyn SummaryProvider>, max_chars: usize) -> Self {
        Self {
            provider,
            max_chars,
        }
    }

    fn try_summarize(
        &self,
        filename: &str,
        text: &str,
        keywords: &[String],
    ) -> Result<String, SummarizeError> {
        let content = prompt::user_content(filename, text, keywords, self.max_chars);
        let reply = self.provider.summarize(prompt::system_prompt(), &content)?;
        let summary = normalize_whitespace(&reply);
        if summary.is_empty() {
            return Err(SummarizeError::ParseError("Provider returned an empty summary".to_string()));
        }
        Ok(summary)
    }
}

impl Summarizer for ProviderSummarizer {
    fn summarize(&self, filename: &str, text: &str, keywords: &[String]) -> Summary {
        if text.trim().is_empty() {
            return FallbackSummarizer.summarize(filename, text, keywords);
        }

        match self.try_summarize(filename, text, keywords) {
            Ok(summary) => {
                tracing::debug!(
                    "Summarized {} with {}",
                    filename,
                    self.provider.describe()
                );
                Summary {
                    text: summary,
                    source: SummarySource::Provider,
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Summary via {} failed for {}: {}",
                    self.provider.describe(),
                    filename,
                    e
                );
                FallbackSummarizer.summarize(filename, text, keywords)
            }
        }
    }
}

/// Builds a summary from the leading sentences and the keyword list.
pub struct FallbackSummarizer;

impl Summarizer for FallbackSummarizer {
    fn summarize(&self, _filename: &str, text: &str, keywords: &[String]) -> Summary {
        Summary {
            text: local_summary(text, keywords),
            source: SummarySource::Fallback,
        }
    }
}

fn local_summary(text: &str, keywords: &[String]) -> String {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return EMPTY_DOCUMENT_SUMMARY.to_string();
    }

    let mut summary = String::new();
    for sentence in sentences.iter().take(FALLBACK_SENTENCES) {
        let separator = usize::from(!summary.is_empty());
        let sentence_chars = sentence.chars().count();
        if summary.chars().count() + separator + sentence_chars > FALLBACK_SUMMARY_CHARS {
            if summary.is_empty() {
                let cut: String = sentence.chars().take(FALLBACK_SUMMARY_CHARS - 3).collect();
                summary = format!("{}...", cut.trim_end());
            }
            break;
        }
        if separator == 1 {
            summary.push(' ');
        }
        summary.push_str(sentence);
    }

    if !keywords.is_empty() {
        summary.push_str("\n\nKey topics: ");
        summary.push_str(&keywords.join(", "));
    }
    summary
}

/// Splits text into sentences at `.`, `!` or `?` followed by whitespace,
/// and at line breaks.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    fn finish(current: &mut String, sentences: &mut Vec<String>) {
        let sentence = current.split_whitespace().collect::<Vec<_>>().join(" ");
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        current.clear();
    }

    while let Some(ch) = chars.next() {
        if ch == '\n' {
            finish(&mut current, &mut sentences);
            continue;
        }
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') && chars.peek().map_or(true, |next| next.is_whitespace()) {
            finish(&mut current, &mut sentences);
        }
    }
    finish(&mut current, &mut sentences);
    sentences
}

/// Trims the text and collapses runs of 3+ newlines down to 2.
fn normalize_whitespace(text: &str) -> String {
    let trimmed = text.trim();
    let mut result = String::with_capacity(trimmed.len());
    let mut consecutive_newlines = 0u32;

    for ch in trimmed.chars() {
        if ch == '\n' {
            consecutive_newlines += 1;
            if consecutive_newlines <= 2 {
                result.push(ch);
            }
        } else {
            consecutive_newlines = 0;
            result.push(ch);
        }
    }

    result
}

/// Errors that can occur while calling a summary provider.
#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    /// No summary provider is configured.
    #[error(
        "Summary provider not configured. Set summary_provider and an API key with 'docbrief config set'."
    )]
    NotConfigured,

    /// Network or connection error when calling the provider API.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The provider API returned a non-success HTTP status code.
    #[error("HTTP error ({status}): {body}")]
    HttpError { status: u16, body: String },

    /// The provider response could not be understood.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct StubProvider {
        reply: Result<String, u16>,
        seen: RefCell<Vec<String>>,
    }

    impl SummaryProvider for StubProvider {
        fn summarize(&self, _system: &str, user_content: &str) -> Result<String, SummarizeError> {
            self.seen.borrow_mut().push(user_content.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(SummarizeError::HttpError {
                    status: *status,
                    body: "boom".to_string(),
                }),
            }
        }

        fn describe(&self) -> String {
            "stub/test".to_string()
        }
    }

    fn stub(reply: Result<&str, u16>) -> StubProvider {
        StubProvider {
            reply: reply.map(str::to_string),
            seen: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn test_provider_summary_is_normalized() {
        let summarizer = ProviderSummarizer::new(Box::new(stub(Ok("\n Overview.\n\n\n- one\n"))), 1000);
        let summary = summarizer.summarize("a.txt", "Some text.", &[]);
        assert_eq!(summary.text, "Overview.\n\n- one");
        assert_eq!(summary.source, SummarySource::Provider);
    }

    #[test]
    fn test_provider_failure_falls_back() {
        let summarizer = ProviderSummarizer::new(Box::new(stub(Err(429))), 1000);
        let summary = summarizer.summarize(
            "a.txt",
            "The budget was approved. Hiring starts in May.",
            &["budget".to_string()],
        );
        assert_eq!(summary.source, SummarySource::Fallback);
        assert!(summary.text.starts_with("The budget was approved."));
        assert!(summary.text.ends_with("Key topics: budget"));
    }

    #[test]
    fn test_provider_empty_reply_falls_back() {
        let summarizer = ProviderSummarizer::new(Box::new(stub(Ok("   "))), 1000);
        let summary = summarizer.summarize("a.txt", "Text here.", &[]);
        assert_eq!(summary.source, SummarySource::Fallback);
    }

    #[test]
    fn test_provider_not_called_for_empty_text() {
        let provider = stub(Ok("should not be used"));
        let summarizer = ProviderSummarizer::new(Box::new(provider), 1000);
        let summary = summarizer.summarize("a.txt", "  \n ", &[]);
        assert_eq!(summary.text, EMPTY_DOCUMENT_SUMMARY);
        assert_eq!(summary.source, SummarySource::Fallback);
    }

    #[test]
    fn test_fallback_takes_leading_sentences() {
        let text = "First point. Second point! Third point? Fourth point.";
        let summary = local_summary(text, &[]);
        assert_eq!(summary, "First point. Second point! Third point?");
    }

    #[test]
    fn test_fallback_truncates_long_first_sentence() {
        let text = "word ".repeat(200);
        let summary = local_summary(&text, &[]);
        assert!(summary.ends_with("..."));
        assert!(summary.chars().count() <= FALLBACK_SUMMARY_CHARS);
    }

    #[test]
    fn test_fallback_empty_text() {
        assert_eq!(local_summary("", &["x".to_string()]), EMPTY_DOCUMENT_SUMMARY);
    }

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("Version 1.5 ships today. Really!\nHeading\n\nBody text");
        assert_eq!(
            sentences,
            vec!["Version 1.5 ships today.", "Really!", "Heading", "Body text"]
        );
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  hello  "), "hello");
        assert_eq!(normalize_whitespace("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize_whitespace("a\n\nb"), "a\n\nb");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_resolve_config_not_configured() {
        if env::var_os("DOCBRIEF_SUMMARY_PROVIDER").is_some() {
            return;
        }
        let result = resolve_config(&Config::default());
        assert!(matches!(result, Err(SummarizeError::NotConfigured)));
    }

    #[test]
    fn test_resolve_config_from_file() {
        if env::var_os("DOCBRIEF_SUMMARY_PROVIDER").is_some()
            || env::var_os("DOCBRIEF_SUMMARY_API_KEY").is_some()
            || env::var_os("DOCBRIEF_SUMMARY_MODEL").is_some()
        {
            return;
        }
        let mut config = Config::default();
        config.summary_provider = Some("anthropic".to_string());
        config.anthropic_api_key = Some("sk-ant".to_string());
        config.summary_model = Some("claude-sonnet-4-5".to_string());

        let resolved = resolve_config(&config).unwrap();
        assert_eq!(resolved.kind, SummaryProviderKind::Anthropic);
        assert_eq!(resolved.api_key, "sk-ant");
        assert_eq!(resolved.model.as_deref(), Some("claude-sonnet-4-5"));
    }

    #[test]
    fn test_resolve_config_missing_key() {
        if env::var_os("DOCBRIEF_SUMMARY_API_KEY").is_some() {
            return;
        }
        let mut config = Config::default();
        config.summary_provider = Some("openai".to_string());
        assert!(matches!(
            resolve_config(&config),
            Err(SummarizeError::NotConfigured)
        ));
    }

    #[test]
    fn test_error_display() {
        let err = SummarizeError::HttpError {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert!(err.to_string().contains("429"));
        assert!(SummarizeError::NotConfigured.to_string().contains("not configured"));
    }
}
