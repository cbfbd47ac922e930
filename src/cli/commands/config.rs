//! Config command - manage configuration

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use crate::config::Config;
use crate::notes::default_notes_path;
use crate::storage::db::default_db_path;

#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    docbrief config                                  Show all settings\n    \
    docbrief config set summary_provider anthropic   Use Claude for summaries\n    \
    docbrief config set anthropic_api_key sk-...     Store the API key\n    \
    docbrief config set keyword_count 5              Keep five keywords\n    \
    docbrief config set summary_model \"\"             Clear a setting")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value (an empty value clears it)
    Set { key: String, value: String },
    /// Print the config file path
    Path,
}

pub fn run(args: Args) -> Result<()> {
    match args.command {
        Some(ConfigCommand::Show) | None => show_config(),
        Some(ConfigCommand::Get { key }) => get_config(&key),
        Some(ConfigCommand::Set { key, value }) => set_config(&key, &value),
        Some(ConfigCommand::Path) => {
            println!("{}", Config::config_path()?.display());
            Ok(())
        }
    }
}

fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("{}", "docbrief configuration".bold());
    println!();
    println!("  {}  {}", "Config:  ".dimmed(), Config::config_path()?.display());
    println!("  {}  {}", "Database:".dimmed(), default_db_path()?.display());
    println!("  {}  {}", "Notes:   ".dimmed(), default_notes_path()?.display());
    println!();

    for key in Config::keys() {
        let value = match config.get(key)? {
            Some(value) if key.ends_with("api_key") => mask_secret(&value),
            Some(value) => value,
            None => "(not set)".dimmed().to_string(),
        };
        println!("  {:<20} {}", key, value);
    }

    Ok(())
}

fn get_config(key: &str) -> Result<()> {
    let config = Config::load()?;
    match config.get(key)? {
        Some(value) => println!("{value}"),
        None => println!("{}", format!("Config key '{key}' is not set").yellow()),
    }
    Ok(())
}

fn set_config(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    if value.trim().is_empty() {
        println!("{} {}", "Cleared".green(), key);
    } else if key.ends_with("api_key") {
        println!("{} {} = {}", "Set".green(), key, mask_secret(value.trim()));
    } else {
        println!("{} {} = {}", "Set".green(), key, value.trim());
    }
    Ok(())
}

/// Keeps the last four characters of a secret visible.
fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}
