//! Note command - create, browse and edit notes.
//!
//! Notes are kept apart from analyses in `notes.json` inside the data
//! directory. Each note has a title, free-form content, one category and
//! any number of tags.

use std::io::{self, Write};

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;

use crate::cli::format::truncate_to_width;
use crate::cli::OutputFormat;
use crate::notes::{LabelCount, NewNote, Note, NoteFilter, NoteStore, NoteUpdate};

#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    docbrief note add \"Standup\" -c work -t daily      Create a note\n    \
    docbrief note list --tag daily                   Notes tagged 'daily'\n    \
    docbrief note list -q budget                     Search title, content and tags\n    \
    docbrief note edit abc123 --content \"Moved\"      Change the content\n    \
    docbrief note tags                               Tags with note counts")]
pub struct Args {
    #[command(subcommand)]
    pub command: NoteCommand,
}

#[derive(Subcommand)]
pub enum NoteCommand {
    /// Create a note
    Add {
        /// Note title
        title: String,
        /// Note body
        #[arg(long, default_value = "")]
        content: String,
        /// Category (default: general)
        #[arg(short, long)]
        category: Option<String>,
        /// Tag to attach, repeatable
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        /// Output format: text (default), json
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// List notes, most recently updated first
    List {
        /// Only notes in this category
        #[arg(short, long)]
        category: Option<String>,
        /// Only notes with this tag
        #[arg(short, long)]
        tag: Option<String>,
        /// Case-insensitive text to look for in title, content and tags
        #[arg(short, long)]
        query: Option<String>,
        /// Maximum number of notes to display
        #[arg(short, long, value_name = "N")]
        limit: Option<usize>,
        /// Output format: text (default), json
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Show one note
    Show {
        /// Note ID prefix
        id: String,
        /// Output format: text (default), json
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Change fields of a note
    Edit {
        /// Note ID prefix
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        /// Replace the tags, repeatable
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        /// Remove all tags
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },
    /// Delete a note
    Delete {
        /// Note ID prefix
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// List tags with note counts
    Tags {
        /// Output format: text (default), json
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// List categories with note counts
    Categories {
        /// Output format: text (default), json
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

pub fn run(args: Args) -> Result<()> {
    let mut store = NoteStore::open_default()?;

    match args.command {
        NoteCommand::Add {
            title,
            content,
            category,
            tags,
            format,
        } => {
            let note = store.create(NewNote {
                title,
                content,
                category,
                tags,
            })?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&note)?),
                OutputFormat::Text => {
                    println!("{} note {}", "Created".green(), note.short_id().cyan())
                }
            }
        }
        NoteCommand::List {
            category,
            tag,
            query,
            limit,
            format,
        } => {
            let notes = store.list(&NoteFilter {
                category,
                tag,
                query,
                limit,
            });
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&notes)?),
                OutputFormat::Text => print_notes(&notes),
            }
        }
        NoteCommand::Show { id, format } => {
            let note = store.find_by_prefix(&id)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(note)?),
                OutputFormat::Text => print_note(note),
            }
        }
        NoteCommand::Edit {
            id,
            title,
            content,
            category,
            tags,
            clear_tags,
        } => {
            let update = NoteUpdate {
                title,
                content,
                category,
                tags: if clear_tags {
                    Some(Vec::new())
                } else if tags.is_empty() {
                    None
                } else {
                    Some(tags)
                },
            };
            if update.is_empty() {
                bail!("Nothing to change. Pass --title, --content, --category, --tag or --clear-tags.");
            }

            let id = store.find_by_prefix(&id)?.id;
            let note = store.update(&id, update)?;
            println!("{} note {}", "Updated".green(), note.short_id().cyan());
        }
        NoteCommand::Delete { id, force } => {
            let note = store.find_by_prefix(&id)?.clone();
            if !force && !confirm(&format!("Delete note '{}'?", note.title))? {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }
            store.delete(&note.id)?;
            println!("{} note {}", "Deleted".green(), note.short_id().cyan());
        }
        NoteCommand::Tags { format } => print_counts(&store.tags(), "tags", format)?,
        NoteCommand::Categories { format } => {
            print_counts(&store.categories(), "categories", format)?
        }
    }

    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn print_notes(notes: &[Note]) {
    if notes.is_empty() {
        println!("{}", "No notes found.".dimmed());
        println!();
        println!("Run 'docbrief note add <TITLE>' to create one.");
        return;
    }

    const ID_WIDTH: usize = 8;
    const UPDATED_WIDTH: usize = 16;
    const CATEGORY_WIDTH: usize = 12;
    const TITLE_WIDTH: usize = 32;

    println!(
        "{}",
        format!(
            "{:<ID_WIDTH$}  {:<UPDATED_WIDTH$}  {:<CATEGORY_WIDTH$}  {:<TITLE_WIDTH$}  {}",
            "ID", "UPDATED", "CATEGORY", "TITLE", "TAGS"
        )
        .bold()
    );

    for note in notes {
        let updated = note
            .updated_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string();
        println!(
            "{:<ID_WIDTH$}  {:<UPDATED_WIDTH$}  {:<CATEGORY_WIDTH$}  {:<TITLE_WIDTH$}  {}",
            note.short_id().cyan(),
            updated.dimmed(),
            truncate_to_width(&note.category, CATEGORY_WIDTH),
            truncate_to_width(&note.title, TITLE_WIDTH),
            note.tags.join(", ").yellow()
        );
    }
}

fn print_note(note: &Note) {
    println!("{} {}", note.title.bold(), note.short_id().cyan());
    println!("  {}  {}", "Category:".dimmed(), note.category);
    if !note.tags.is_empty() {
        println!("  {}      {}", "Tags:".dimmed(), note.tags.join(", ").yellow());
    }
    println!(
        "  {}   {}",
        "Created:".dimmed(),
        note.created_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "  {}   {}",
        "Updated:".dimmed(),
        note.updated_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
    );
    if !note.content.is_empty() {
        println!();
        println!("{}", note.content);
    }
}

fn print_counts(counts: &[LabelCount], what: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(counts)?),
        OutputFormat::Text => {
            if counts.is_empty() {
                println!("{}", format!("No {what} yet.").dimmed());
            }
            for label in counts {
                println!("{:>5}  {}", label.count, label.name);
            }
        }
    }
    Ok(())
}
