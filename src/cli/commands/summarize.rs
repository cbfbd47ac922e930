//! Summarize command - view, replace or regenerate an analysis summary.

use anyhow::{bail, Result};
use colored::Colorize;

use crate::analyze::Analyzer;
use crate::cli::format::source_label;
use crate::cli::resolve_analysis;
use crate::config::Config;
use crate::storage::{Database, SummarySource};
use crate::summarize::{resolve_config, SummarizeError};

/// Arguments for the summarize command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    docbrief summarize abc123                          Show the current summary\n    \
    docbrief summarize abc123 \"Q3 budget approved\"     Replace the summary\n    \
    docbrief summarize abc123 --generate               Regenerate the summary")]
pub struct Args {
    /// Analysis ID prefix
    #[arg(value_name = "ID")]
    pub id: String,

    /// New summary text
    #[arg(value_name = "SUMMARY")]
    #[arg(
        long_help = "Summary text to store in place of the generated one.\n\
        Omit it to print the current summary."
    )]
    pub summary: Option<String>,

    /// Regenerate the summary from the stored text
    #[arg(long)]
    #[arg(long_help = "Generate a new summary from the stored text. Uses the\n\
        configured LLM provider when one is set via 'docbrief config set',\n\
        otherwise builds a summary locally. Cannot be used with summary text.")]
    pub generate: bool,
}

/// Executes the summarize command.
pub fn run(args: Args) -> Result<()> {
    let db = Database::open_default()?;
    let analysis = resolve_analysis(&db, &args.id)?;
    let short_id = analysis.short_id();

    if args.generate && args.summary.is_some() {
        bail!("Cannot use --generate with manual summary text.");
    }

    if args.generate {
        let config = Config::load()?;
        if let Err(SummarizeError::NotConfigured) = resolve_config(&config) {
            eprintln!(
                "{}\n\n\
                 To use an LLM provider:\n  \
                 docbrief config set summary_provider <anthropic|openai|openrouter>\n  \
                 docbrief config set <provider>_api_key <key>\n",
                "No summary provider configured, summarizing locally.".yellow()
            );
        }

        let summary = Analyzer::from_config(&config).resummarize(&analysis);
        db.update_summary(&analysis.id, &summary.text, summary.source)?;
        println!(
            "{} {} ({})",
            "Generated summary for".green(),
            short_id.cyan(),
            source_label(summary.source, 0)
        );
        println!("{}", summary.text);
    } else if let Some(text) = args.summary {
        let text = text.trim();
        if text.is_empty() {
            bail!("Summary text cannot be empty.");
        }
        db.update_summary(&analysis.id, text, SummarySource::Manual)?;
        println!("{} {}", "Updated summary for".green(), short_id.cyan());
    } else {
        println!(
            "{} {} ({})",
            "Summary for".bold(),
            short_id.cyan(),
            source_label(analysis.source, 0)
        );
        println!("{}", analysis.summary);
    }

    Ok(())
}
