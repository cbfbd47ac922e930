//! Show command - display one stored analysis.

use anyhow::Result;
use colored::Colorize;

use crate::cli::format::source_label;
use crate::cli::{resolve_analysis, OutputFormat};
use crate::storage::{Analysis, Database};

/// Arguments for the show command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    docbrief show abc123             Show summary and keywords\n    \
    docbrief show abc123 --text      Include the extracted text\n    \
    docbrief show abc123 --format json")]
pub struct Args {
    /// Analysis ID prefix
    #[arg(value_name = "ID")]
    #[arg(
        long_help = "The analysis ID prefix to show. Must uniquely identify a\n\
        single analysis. Use 'docbrief list' to find IDs."
    )]
    pub id: String,

    /// Also print the full extracted text
    #[arg(long)]
    pub text: bool,

    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Executes the show command.
pub fn run(args: Args) -> Result<()> {
    let db = Database::open_default()?;
    let analysis = resolve_analysis(&db, &args.id)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
        OutputFormat::Text => print_details(&analysis, args.text),
    }

    Ok(())
}

fn print_details(analysis: &Analysis, with_text: bool) {
    println!(
        "{} {}",
        "Analysis".bold(),
        analysis.id.to_string().cyan()
    );
    println!("  {}      {}", "File:".dimmed(), analysis.filename);
    if !analysis.file_type.is_empty() {
        println!("  {}      {}", "Type:".dimmed(), analysis.file_type);
    }
    println!("  {}     {}", "Words:".dimmed(), analysis.word_count);
    println!(
        "  {}   {}",
        "Created:".dimmed(),
        analysis
            .created_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
    );
    if analysis.updated_at != analysis.created_at {
        println!(
            "  {}   {}",
            "Updated:".dimmed(),
            analysis
                .updated_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
        );
    }
    println!("  {}    {}", "Source:".dimmed(), source_label(analysis.source, 0));
    if !analysis.keywords.is_empty() {
        println!(
            "  {}  {}",
            "Keywords:".dimmed(),
            analysis.keywords.join(", ").yellow()
        );
    }

    println!();
    println!("{}", "Summary".bold());
    for line in analysis.summary.lines() {
        println!("  {line}");
    }

    if with_text {
        println!();
        println!("{}", "Extracted text".bold());
        println!("{}", analysis.full_text);
    }
}
