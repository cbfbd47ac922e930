//! The analysis pipeline: extract, count keywords, summarize.
//!
//! [`Analyzer::analyze_file`] turns a document on disk into an unsaved
//! [`Analysis`]. Extraction and summarization failures never abort the
//! pipeline; they produce fallback text instead.

mod keywords;

use std::path::Path;

use chrono::Utc;
use uuid::Uuid;

use crate::config::Config;
use crate::extract::{self, Extracted};
use crate::storage::{Analysis, SummarySource};
use crate::summarize::{self, Summarizer};

pub use keywords::{extract_keywords, word_count};

/// Shortens `text` to roughly `max_chars` characters for a summary request.
///
/// Text that fits is returned unchanged. Longer text keeps its first 70%
/// and last 30% of the budget, joined by a marker stating how many
/// characters were dropped. A budget of 0 disables truncation.
pub fn truncate_for_summary(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    if max_chars == 0 || total <= max_chars {
        return text.to_string();
    }

    let head_chars = max_chars * 7 / 10;
    let tail_chars = max_chars - head_chars;
    let omitted = total - head_chars - tail_chars;

    let head: String = text.chars().take(head_chars).collect();
    let tail: String = text.chars().skip(total - tail_chars).collect();

    format!(
        "{}\n\n[... {omitted} characters omitted ...]\n\n{}",
        head.trim_end(),
        tail.trim_start()
    )
}

/// Runs documents through extraction, keyword counting and summarization.
pub struct Analyzer {
    summarizer: Box<dyn Summarizer>,
    keyword_count: usize,
}

impl Analyzer {
    pub fn new(summarizer: Box<dyn Summarizer>, keyword_count: usize) -> Self {
        Self {
            summarizer,
            keyword_count,
        }
    }

    /// An analyzer using the summary provider and keyword settings in `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(summarize::build_summarizer(config), config.keyword_count)
    }

    /// Analyzes the file at `path`, recorded under `display_name`.
    pub fn analyze_file(&self, path: &Path, display_name: &str) -> Analysis {
        let extracted = extract::extract_or_fallback(path, display_name);
        tracing::debug!(
            "Extracted {} chars from {} ({})",
            extracted.text.len(),
            display_name,
            extracted.kind
        );
        self.analyze_extracted(display_name, extracted)
    }

    /// Builds an analysis from already extracted text.
    pub fn analyze_extracted(&self, display_name: &str, extracted: Extracted) -> Analysis {
        let (summary, source, keywords, words) = if extracted.succeeded {
            let keywords = extract_keywords(&extracted.text, self.keyword_count);
            let summary = self
                .summarizer
                .summarize(display_name, &extracted.text, &keywords);
            let words = word_count(&extracted.text) as i64;
            (summary.text, summary.source, keywords, words)
        } else {
            // The placeholder is the best summary there is.
            (extracted.text.clone(), SummarySource::Fallback, Vec::new(), 0)
        };

        let now = Utc::now();
        Analysis {
            id: Uuid::new_v4(),
            filename: display_name.to_string(),
            file_type: extract::extension_of(Path::new(display_name)),
            summary,
            full_text: extracted.text,
            keywords,
            word_count: words,
            source,
            created_at: now,
            updated_at: now,
        }
    }

    /// Produces a fresh summary for an existing analysis.
    ///
    /// Records whose extraction failed get their placeholder back without
    /// a summarizer call.
    pub fn resummarize(&self, analysis: &Analysis) -> summarize::Summary {
        if analysis.extraction_failed() {
            tracing::debug!("No extracted text for {}, keeping placeholder", analysis.filename);
            return summarize::Summary {
                text: analysis.full_text.clone(),
                source: SummarySource::Fallback,
            };
        }
        self.summarizer
            .summarize(&analysis.filename, &analysis.full_text, &analysis.keywords)
    }
}
