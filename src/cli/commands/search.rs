//! Search command - find analyses by text

use anyhow::Result;
use colored::Colorize;

use crate::cli::commands::list::print_table;
use crate::cli::OutputFormat;
use crate::storage::Database;

#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    docbrief search invoice           Match file names, summaries and text\n    \
    docbrief search \"q3 revenue\" -l 5")]
pub struct Args {
    /// Search query (case-insensitive substring)
    pub query: String,

    /// Limit results
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

pub fn run(args: Args) -> Result<()> {
    let db = Database::open_default()?;
    let results = db.search_analyses(&args.query, args.limit)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Text => {
            if results.is_empty() {
                println!(
                    "{}",
                    format!("No analyses match '{}'.", args.query).dimmed()
                );
                return Ok(());
            }
            print_table(&results);
        }
    }

    Ok(())
}
