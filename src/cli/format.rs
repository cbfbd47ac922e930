//! Output formatting utilities for CLI commands.
//!
//! Provides the shared `OutputFormat` enum and a few helpers for
//! fitting text into table columns.

use clap::ValueEnum;
use colored::{ColoredString, Colorize};

use crate::storage::SummarySource;

/// Output format options for CLI commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default).
    #[default]
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Truncates `s` to at most `max_width` characters, ending in "..." when cut.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        ".".repeat(max_width)
    } else {
        let kept: String = s.chars().take(max_width - 3).collect();
        format!("{kept}...")
    }
}

/// Summary source label padded to `width`, colored by origin.
pub fn source_label(source: SummarySource, width: usize) -> ColoredString {
    let label = format!("{:<width$}", source.to_string());
    match source {
        SummarySource::Provider => label.green(),
        SummarySource::Fallback => label.yellow(),
        SummarySource::Manual => label.cyan(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(
            OutputFormat::from_str("text", false).unwrap(),
            OutputFormat::Text
        );
        assert_eq!(
            OutputFormat::from_str("json", false).unwrap(),
            OutputFormat::Json
        );
        assert!(OutputFormat::from_str("markdown", false).is_err());
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
        assert_eq!(truncate_to_width("hello", 5), "hello");
        assert_eq!(truncate_to_width("hello world", 8), "hello...");
        assert_eq!(truncate_to_width("hello", 2), "..");
    }

    #[test]
    fn test_source_label_padding() {
        assert_eq!(&*source_label(SummarySource::Manual, 8), "manual  ");
        assert_eq!(&*source_label(SummarySource::Fallback, 0), "fallback");
    }

    #[test]
    fn test_truncate_to_width_multibyte() {
        assert_eq!(truncate_to_width("résumé-final.txt", 9), "résumé...");
    }
}
