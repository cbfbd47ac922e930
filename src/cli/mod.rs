//! Command-line interface for docbrief.
//!
//! Provides the commands for analyzing documents, browsing and editing
//! stored analyses, managing notes and running the HTTP service.

/// Individual CLI command implementations.
pub mod commands;

/// Output formatting utilities.
pub mod format;

pub use format::OutputFormat;

use anyhow::{bail, Result};

use crate::storage::{Analysis, Database};

/// Resolves an analysis ID prefix, with a hint when nothing matches.
pub fn resolve_analysis(db: &Database, prefix: &str) -> Result<Analysis> {
    match db.find_by_prefix(prefix)? {
        Some(analysis) => Ok(analysis),
        None if db.analysis_count()? == 0 => bail!(
            "No analysis found matching '{}'. No analyses stored yet. \
             Run 'docbrief analyze <FILE>' first.",
            prefix
        ),
        None => bail!(
            "No analysis found matching '{}'. \
             Run 'docbrief list' to see stored analyses.",
            prefix
        ),
    }
}
