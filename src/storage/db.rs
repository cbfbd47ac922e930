//! SQLite storage layer for analyses

use anyhow::{bail, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{functions::FunctionFlags, params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::models::{Analysis, SummarySource};

/// Current schema version, recorded in `schema_version`.
const SCHEMA_VERSION: i64 = 1;

const ANALYSIS_COLUMNS: &str = "id, filename, file_type, summary, full_text, keywords, word_count, source, created_at, updated_at";

/// Get the default database path
pub fn default_db_path() -> Result<PathBuf> {
    Ok(crate::config::data_dir()?.join("docbrief.db"))
}

/// Database connection wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create the database
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        register_functions(&conn)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open the default database
    pub fn open_default() -> Result<Self> {
        let path = default_db_path()?;
        Self::open(&path)
    }

    /// Run migrations
    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS analyses (
                id TEXT PRIMARY KEY,
                filename TEXT NOT NULL,
                file_type TEXT NOT NULL DEFAULT '',
                summary TEXT NOT NULL,
                full_text TEXT NOT NULL,
                keywords TEXT NOT NULL DEFAULT '[]',
                word_count INTEGER NOT NULL DEFAULT 0,
                source TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_analyses_created_at ON analyses(created_at);
            "#,
        )?;
        self.conn.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;
        Ok(())
    }

    // ==================== Analyses ====================

    /// Insert a new analysis, replacing any row with the same id
    pub fn insert_analysis(&self, analysis: &Analysis) -> Result<()> {
        let keywords_json = serde_json::to_string(&analysis.keywords)?;

        self.conn.execute(
            r#"
            INSERT INTO analyses (id, filename, file_type, summary, full_text, keywords, word_count, source, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                filename = ?2,
                file_type = ?3,
                summary = ?4,
                full_text = ?5,
                keywords = ?6,
                word_count = ?7,
                source = ?8,
                updated_at = ?10
            "#,
            params![
                analysis.id.to_string(),
                analysis.filename,
                analysis.file_type,
                analysis.summary,
                analysis.full_text,
                keywords_json,
                analysis.word_count,
                analysis.source.to_string(),
                format_timestamp(&analysis.created_at),
                format_timestamp(&analysis.updated_at),
            ],
        )?;
        Ok(())
    }

    /// Get an analysis by ID
    pub fn get_analysis(&self, id: &Uuid) -> Result<Option<Analysis>> {
        self.conn
            .query_row(
                &format!("SELECT {ANALYSIS_COLUMNS} FROM analyses WHERE id = ?1"),
                params![id.to_string()],
                Self::row_to_analysis,
            )
            .optional()
            .context("Failed to get analysis")
    }

    /// Resolve an ID prefix to exactly one analysis.
    ///
    /// Returns `Ok(None)` when nothing matches and an error when the
    /// prefix is ambiguous.
    pub fn find_by_prefix(&self, prefix: &str) -> Result<Option<Analysis>> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            bail!("Analysis ID cannot be empty");
        }

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ANALYSIS_COLUMNS} FROM analyses WHERE id LIKE ?1 ESCAPE '\\' ORDER BY created_at DESC LIMIT 10"
        ))?;
        let rows = stmt.query_map(
            params![format!("{}%", escape_like(&prefix))],
            Self::row_to_analysis,
        )?;
        let mut matching = rows
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to look up analysis")?;

        match matching.len() {
            0 => Ok(None),
            1 => Ok(matching.pop()),
            _ => {
                let ids: Vec<String> = matching.iter().map(|a| a.short_id()).collect();
                bail!(
                    "Ambiguous analysis prefix '{}'. Matches: {}",
                    prefix,
                    ids.join(", ")
                )
            }
        }
    }

    /// List recent analyses, newest first
    pub fn list_analyses(&self, limit: usize) -> Result<Vec<Analysis>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ANALYSIS_COLUMNS} FROM analyses ORDER BY created_at DESC LIMIT ?1"
        ))?;

        let rows = stmt.query_map(params![limit as i64], Self::row_to_analysis)?;
        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to list analyses")
    }

    /// Case-insensitive substring search over filename, summary, text and keywords.
    ///
    /// An empty query lists recent analyses.
    pub fn search_analyses(&self, query: &str, limit: usize) -> Result<Vec<Analysis>> {
        let query = query.trim();
        if query.is_empty() {
            return self.list_analyses(limit);
        }

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ANALYSIS_COLUMNS} FROM analyses
             WHERE unicode_lower(filename) LIKE ?1 ESCAPE '\\'
                OR unicode_lower(summary) LIKE ?1 ESCAPE '\\'
                OR unicode_lower(full_text) LIKE ?1 ESCAPE '\\'
                OR unicode_lower(keywords) LIKE ?1 ESCAPE '\\'
             ORDER BY created_at DESC
             LIMIT ?2"
        ))?;

        // SQLite's LIKE only folds ASCII, so both sides are lowercased first.
        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
        let rows = stmt.query_map(params![pattern, limit as i64], Self::row_to_analysis)?;
        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to search analyses")
    }

    /// Replace the summary of an analysis.
    ///
    /// Returns false when no analysis has this id.
    pub fn update_summary(&self, id: &Uuid, summary: &str, source: SummarySource) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE analyses SET summary = ?2, source = ?3, updated_at = ?4 WHERE id = ?1",
            params![
                id.to_string(),
                summary,
                source.to_string(),
                format_timestamp(&Utc::now())
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete an analysis. Returns false when it did not exist.
    pub fn delete_analysis(&self, id: &Uuid) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM analyses WHERE id = ?1", params![id.to_string()])?;
        Ok(deleted > 0)
    }

    fn row_to_analysis(row: &rusqlite::Row) -> rusqlite::Result<Analysis> {
        let keywords_json: String = row.get(5)?;
        let source_str: String = row.get(7)?;

        Ok(Analysis {
            id: parse_uuid(0, &row.get::<_, String>(0)?)?,
            filename: row.get(1)?,
            file_type: row.get(2)?,
            summary: row.get(3)?,
            full_text: row.get(4)?,
            keywords: serde_json::from_str(&keywords_json).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
            })?,
            word_count: row.get(6)?,
            source: source_str.parse().map_err(|e: String| {
                rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, e.into())
            })?,
            created_at: parse_timestamp(8, &row.get::<_, String>(8)?)?,
            updated_at: parse_timestamp(9, &row.get::<_, String>(9)?)?,
        })
    }

    // ==================== Stats ====================

    /// Get total analysis count
    pub fn analysis_count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM analyses", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Registers `unicode_lower(text)`, a `lower()` that folds every script.
fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "unicode_lower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| s.to_lowercase())),
    )
    .context("Failed to register SQL functions")
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_uuid(idx: usize, value: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Escapes LIKE wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
