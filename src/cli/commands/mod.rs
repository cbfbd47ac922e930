//! CLI commands for docbrief.
//!
//! Each submodule implements a single CLI command with its argument
//! parsing and execution logic.

/// Analyze documents and store the results.
pub mod analyze;

/// Configuration viewing and management.
pub mod config;

/// Permanently remove an analysis.
pub mod delete;

/// List stored analyses.
pub mod list;

/// Note management.
pub mod note;

/// Search stored analyses.
pub mod search;

/// Run the HTTP service.
pub mod serve;

/// Display one analysis.
pub mod show;

/// View, replace or regenerate a summary.
pub mod summarize;
