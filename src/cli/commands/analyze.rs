//! Analyze command - extract, summarize and store documents.

use std::path::PathBuf;

use anyhow::{bail, Result};
use colored::Colorize;

use crate::analyze::Analyzer;
use crate::cli::format::source_label;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::storage::{Analysis, Database};

/// Arguments for the analyze command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    docbrief analyze report.md              Analyze and store one file\n    \
    docbrief analyze *.txt                  Analyze several files\n    \
    docbrief analyze data.csv --no-save     Print the analysis only\n    \
    docbrief analyze page.html --format json")]
pub struct Args {
    /// Files to analyze
    #[arg(value_name = "FILE", required = true)]
    #[arg(
        long_help = "Documents to analyze. Text is extracted from plain text,\n\
        Markdown, JSON, CSV/TSV and HTML files. Other files are stored with\n\
        a placeholder summary explaining why no text was extracted."
    )]
    pub files: Vec<PathBuf>,

    /// Print the analysis without storing it
    #[arg(long)]
    pub no_save: bool,

    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Executes the analyze command.
pub fn run(args: Args) -> Result<()> {
    let config = Config::load()?;
    let analyzer = Analyzer::from_config(&config);
    let db = if args.no_save {
        None
    } else {
        Some(Database::open_default()?)
    };

    let mut analyses = Vec::new();
    let mut failed = 0usize;

    for path in &args.files {
        if !path.is_file() {
            eprintln!("{} {} is not a file", "Skipping:".yellow(), path.display());
            failed += 1;
            continue;
        }

        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let analysis = analyzer.analyze_file(path, &display_name);
        if let Some(db) = &db {
            db.insert_analysis(&analysis)?;
        }
        tracing::debug!("Analyzed {} as {}", path.display(), analysis.id);

        if args.format == OutputFormat::Text {
            print_analysis(&analysis, db.is_some());
        }
        analyses.push(analysis);
    }

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&analyses)?);
    }

    if analyses.is_empty() && failed > 0 {
        bail!("No files were analyzed");
    }

    Ok(())
}

fn print_analysis(analysis: &Analysis, saved: bool) {
    let id = if saved {
        analysis.short_id().cyan()
    } else {
        "unsaved".dimmed()
    };

    println!("{} {}", analysis.filename.bold(), id);
    println!(
        "  {}  {}   {}  {}",
        "Words:".dimmed(),
        analysis.word_count,
        "Summary:".dimmed(),
        source_label(analysis.source, 0)
    );
    if !analysis.keywords.is_empty() {
        println!(
            "  {}  {}",
            "Keywords:".dimmed(),
            analysis.keywords.join(", ").yellow()
        );
    }
    println!();
    for line in analysis.summary.lines() {
        println!("  {line}");
    }
    println!();
}
