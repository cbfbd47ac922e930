//! List command - show stored analyses, newest first.

use anyhow::Result;
use colored::Colorize;

use crate::cli::format::{source_label, truncate_to_width};
use crate::cli::OutputFormat;
use crate::storage::{Analysis, Database};

/// Arguments for the list command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    docbrief list                  List recent analyses (default 20)\n    \
    docbrief list --limit 50       Show up to 50 analyses\n    \
    docbrief list --format json    Output as JSON")]
pub struct Args {
    /// Maximum number of analyses to display
    #[arg(short, long, default_value = "20", value_name = "N")]
    pub limit: usize,

    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Executes the list command.
pub fn run(args: Args) -> Result<()> {
    let db = Database::open_default()?;
    let analyses = db.list_analyses(args.limit)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analyses)?),
        OutputFormat::Text => {
            if analyses.is_empty() {
                println!("{}", "No analyses found.".dimmed());
                println!();
                println!("Run 'docbrief analyze <FILE>' to analyze a document.");
                return Ok(());
            }
            print_table(&analyses);
        }
    }

    Ok(())
}

/// Prints analyses as an aligned table. Shared with the search command.
pub fn print_table(analyses: &[Analysis]) {
    const ID_WIDTH: usize = 8;
    const CREATED_WIDTH: usize = 16;
    const WORDS_WIDTH: usize = 7;
    const SOURCE_WIDTH: usize = 8;
    const FILE_WIDTH: usize = 32;

    println!(
        "{}",
        format!(
            "{:<ID_WIDTH$}  {:<CREATED_WIDTH$}  {:>WORDS_WIDTH$}  {:<SOURCE_WIDTH$}  {:<FILE_WIDTH$}  {}",
            "ID", "CREATED", "WORDS", "SOURCE", "FILE", "SUMMARY"
        )
        .bold()
    );

    for analysis in analyses {
        let created = analysis
            .created_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string();
        let summary = analysis.summary.lines().next().unwrap_or("");

        println!(
            "{:<ID_WIDTH$}  {:<CREATED_WIDTH$}  {:>WORDS_WIDTH$}  {}  {:<FILE_WIDTH$}  {}",
            analysis.short_id().cyan(),
            created.dimmed(),
            analysis.word_count,
            source_label(analysis.source, SOURCE_WIDTH),
            truncate_to_width(&analysis.filename, FILE_WIDTH),
            truncate_to_width(summary, 60)
        );
    }
}
