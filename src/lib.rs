//! docbrief - document briefs and notes
//!
//! Extracts the text of documents, picks out keywords, summarizes them with
//! an LLM provider or locally, and stores the results in SQLite. A small
//! JSON-backed note collection lives alongside. Both are reachable from the
//! CLI and from an HTTP service.

pub mod analyze;
pub mod cli;
pub mod config;
pub mod extract;
pub mod notes;
pub mod server;
pub mod storage;
pub mod summarize;
