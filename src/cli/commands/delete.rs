//! Delete command - permanently remove a stored analysis.

use std::io::{self, Write};

use anyhow::Result;
use colored::Colorize;

use crate::cli::resolve_analysis;
use crate::storage::Database;

/// Arguments for the delete command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    docbrief delete abc123             Delete analysis (prompts for confirmation)\n    \
    docbrief delete abc123 --force     Delete without confirmation")]
pub struct Args {
    /// Analysis ID prefix to delete
    #[arg(value_name = "ID")]
    #[arg(
        long_help = "The analysis ID prefix to delete. Must uniquely identify a\n\
        single analysis. Use 'docbrief list' to find IDs."
    )]
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long)]
    #[arg(
        long_help = "Skip the confirmation prompt and proceed with deletion.\n\
        Use with caution as this operation cannot be undone."
    )]
    pub force: bool,
}

/// Executes the delete command.
pub fn run(args: Args) -> Result<()> {
    let db = Database::open_default()?;
    let analysis = resolve_analysis(&db, &args.id)?;
    let short_id = analysis.short_id();

    println!();
    println!("{} {}", "Analysis".bold(), analysis.id.to_string().cyan());
    println!("  {}     {}", "File:".dimmed(), analysis.filename);
    println!(
        "  {}  {}",
        "Created:".dimmed(),
        analysis
            .created_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
    );
    println!();

    if !args.force {
        print!("Delete analysis {}? [y/N] ", short_id.cyan());
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("{}", "Cancelled".dimmed());
            return Ok(());
        }
    }

    if db.delete_analysis(&analysis.id)? {
        println!("{} analysis {}", "Deleted".green(), short_id.cyan());
    } else {
        println!("{}", format!("Analysis {short_id} was already gone").dimmed());
    }

    Ok(())
}
