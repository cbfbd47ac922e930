use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category given to notes created without one.
pub const DEFAULT_CATEGORY: &str = "general";

/// A user note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// First 8 characters of the id
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }

    /// Content shortened to one line of at most `max` characters.
    pub fn preview(&self, max: usize) -> String {
        let line = self.content.lines().next().unwrap_or("").trim();
        if line.chars().count() <= max {
            return line.to_string();
        }
        let cut: String = line.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Input for creating a note.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewNote {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A partial note update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl NoteUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.category.is_none() && self.tags.is_none()
    }
}

/// Criteria for listing notes. Every set field must match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteFilter {
    /// Exact category, case-insensitive.
    pub category: Option<String>,
    /// Exact tag, case-insensitive.
    pub tag: Option<String>,
    /// Substring of the title, content or any tag, case-insensitive.
    #[serde(alias = "q")]
    pub query: Option<String>,
    pub limit: Option<usize>,
}

impl NoteFilter {
    pub fn matches(&self, note: &Note) -> bool {
        if let Some(category) = non_blank(&self.category) {
            if note.category != category.to_lowercase() {
                return false;
            }
        }

        if let Some(tag) = non_blank(&self.tag) {
            let tag = tag.to_lowercase();
            if !note.tags.iter().any(|t| *t == tag) {
                return false;
            }
        }

        if let Some(query) = non_blank(&self.query) {
            let query = query.to_lowercase();
            let hit = note.title.to_lowercase().contains(&query)
                || note.content.to_lowercase().contains(&query)
                || note.tags.iter().any(|t| t.contains(&query));
            if !hit {
                return false;
            }
        }

        true
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Trims, lowercases, drops empties, then sorts and dedups.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut tags: Vec<String> = tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

pub(super) fn normalize_category(category: Option<&str>) -> String {
    match category.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_lowercase(),
        _ => default_category(),
    }
}
