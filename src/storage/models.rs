//! Core data models for stored analyses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An Analysis pairs the text extracted from a document with its summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Analysis {
    /// Unique identifier for this analysis
    pub id: Uuid,

    /// Original file name as uploaded
    pub filename: String,

    /// Lowercase extension of the original file ("" when none)
    pub file_type: String,

    /// Summary shown to users
    pub summary: String,

    /// Everything extracted from the document, untruncated
    pub full_text: String,

    /// Most frequent significant words, most frequent first
    pub keywords: Vec<String>,

    /// Number of words in `full_text`
    pub word_count: i64,

    /// Where the summary came from
    pub source: SummarySource,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Analysis {
    /// First eight characters of the id, used in listings.
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }

    /// True when the stored text is an extraction-failure placeholder
    /// rather than document content. Such records carry text but no words.
    pub fn extraction_failed(&self) -> bool {
        self.word_count == 0 && !self.full_text.trim().is_empty()
    }
}

/// Origin of an analysis summary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SummarySource {
    /// Produced by a remote LLM provider.
    Provider,
    /// Produced locally because no provider was available or it failed.
    Fallback,
    /// Written by a user.
    Manual,
}

impl std::fmt::Display for SummarySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummarySource::Provider => write!(f, "provider"),
            SummarySource::Fallback => write!(f, "fallback"),
            SummarySource::Manual => write!(f, "manual"),
        }
    }
}

impl std::str::FromStr for SummarySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "provider" => Ok(SummarySource::Provider),
            "fallback" => Ok(SummarySource::Fallback),
            "manual" => Ok(SummarySource::Manual),
            other => Err(format!("Unknown summary source: '{other}'")),
        }
    }
}
