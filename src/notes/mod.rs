//! Notes kept in a single JSON document.
//!
//! The whole collection is loaded on open and rewritten on every change.
//! Writes go to a temporary file in the same directory which is then
//! renamed over `notes.json`, so a crash never leaves a half-written file.

mod model;

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use model::{normalize_tags, NewNote, Note, NoteFilter, NoteUpdate, DEFAULT_CATEGORY};

/// Version written to the `version` field of the file.
const FORMAT_VERSION: u32 = 1;

/// Errors returned by the note store.
#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    #[error("Note not found: {0}")]
    NotFound(String),

    #[error("Ambiguous note prefix '{prefix}'. Matches: {matches}")]
    Ambiguous { prefix: String, matches: String },

    #[error("Note title cannot be empty")]
    EmptyTitle,

    #[error("Failed to access note file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Note file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct NoteFile {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    notes: Vec<Note>,
}

/// Get the default note file path
pub fn default_notes_path() -> anyhow::Result<PathBuf> {
    Ok(crate::config::data_dir()?.join("notes.json"))
}

/// A count of notes per label, used for tags and categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub name: String,
    pub count: usize,
}

/// File-backed note collection.
#[derive(Debug)]
pub struct NoteStore {
    path: PathBuf,
    notes: Vec<Note>,
}

impl NoteStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self, NoteError> {
        let notes = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            if raw.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str::<NoteFile>(&raw)?.notes
            }
        } else {
            Vec::new()
        };

        tracing::debug!("Loaded {} notes from {}", notes.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            notes,
        })
    }

    /// Opens the default store
    pub fn open_default() -> anyhow::Result<Self> {
        let path = default_notes_path()?;
        Ok(Self::open(&path)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Creates and persists a note.
    pub fn create(&mut self, new: NewNote) -> Result<Note, NoteError> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(NoteError::EmptyTitle);
        }

        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: new.content,
            category: model::normalize_category(new.category.as_deref()),
            tags: normalize_tags(&new.tags),
            created_at: now,
            updated_at: now,
        };

        let mut notes = self.notes.clone();
        notes.push(note.clone());
        self.commit(notes)?;
        Ok(note)
    }

    pub fn get(&self, id: &Uuid) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == *id)
    }

    /// Resolves a full id or unique id prefix.
    pub fn find_by_prefix(&self, prefix: &str) -> Result<&Note, NoteError> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Err(NoteError::NotFound(prefix));
        }

        let matching: Vec<&Note> = self
            .notes
            .iter()
            .filter(|n| n.id.to_string().starts_with(&prefix))
            .collect();

        match matching.as_slice() {
            [] => Err(NoteError::NotFound(prefix)),
            [note] => Ok(note),
            many => Err(NoteError::Ambiguous {
                matches: many
                    .iter()
                    .map(|n| n.short_id())
                    .collect::<Vec<_>>()
                    .join(", "),
                prefix,
            }),
        }
    }

    /// Applies a partial update and persists it.
    pub fn update(&mut self, id: &Uuid, update: NoteUpdate) -> Result<Note, NoteError> {
        if let Some(title) = &update.title {
            if title.trim().is_empty() {
                return Err(NoteError::EmptyTitle);
            }
        }

        let mut notes = self.notes.clone();
        let note = notes
            .iter_mut()
            .find(|n| n.id == *id)
            .ok_or_else(|| NoteError::NotFound(id.to_string()))?;

        if let Some(title) = update.title {
            note.title = title.trim().to_string();
        }
        if let Some(content) = update.content {
            note.content = content;
        }
        if let Some(category) = update.category {
            note.category = model::normalize_category(Some(&category));
        }
        if let Some(tags) = update.tags {
            note.tags = normalize_tags(&tags);
        }
        note.updated_at = Utc::now().max(note.updated_at);

        let updated = note.clone();
        self.commit(notes)?;
        Ok(updated)
    }

    /// Deletes a note. Returns false when it did not exist.
    pub fn delete(&mut self, id: &Uuid) -> Result<bool, NoteError> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        let notes: Vec<Note> = self.notes.iter().filter(|n| n.id != *id).cloned().collect();
        self.commit(notes)?;
        Ok(true)
    }

    /// Notes matching `filter`, most recently updated first.
    pub fn list(&self, filter: &NoteFilter) -> Vec<Note> {
        let mut notes: Vec<Note> = self
            .notes
            .iter()
            .filter(|n| filter.matches(n))
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        if let Some(limit) = filter.limit {
            notes.truncate(limit);
        }
        notes
    }

    /// Categories in use with their note counts, by name.
    pub fn categories(&self) -> Vec<LabelCount> {
        count_labels(self.notes.iter().map(|n| n.category.as_str()))
    }

    /// Tags in use with their note counts, by name.
    pub fn tags(&self) -> Vec<LabelCount> {
        count_labels(self.notes.iter().flat_map(|n| n.tags.iter().map(String::as_str)))
    }

    /// Writes `notes` to disk, then makes them the in-memory state. On
    /// error the store is left as it was.
    fn commit(&mut self, notes: Vec<Note>) -> Result<(), NoteError> {
        let file = NoteFile {
            version: FORMAT_VERSION,
            notes,
        };
        let json = serde_json::to_vec_pretty(&file)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| NoteError::Io(e.error))?;

        self.notes = file.notes;
        tracing::debug!("Saved {} notes to {}", self.notes.len(), self.path.display());
        Ok(())
    }
}

fn count_labels<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<LabelCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(name, count)| LabelCount {
            name: name.to_string(),
            count,
        })
        .collect()
}
