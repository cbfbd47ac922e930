//! Serve command - run the HTTP service in the foreground.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::Config;
use crate::notes::default_notes_path;
use crate::server::{self, AppState};
use crate::storage::db::default_db_path;

/// Arguments for the serve command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    docbrief serve                         Listen on the configured address\n    \
    docbrief serve --port 8080             Override the port\n    \
    docbrief serve --log-file server.log   Also write logs to a file")]
pub struct Args {
    /// Address to bind (default from config: server_host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (default from config: server_port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Append logs to this file as well as the terminal
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Executes the serve command.
pub fn run(args: Args) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(host) = args.host {
        config.server_host = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }

    let state = AppState::open(config, default_db_path()?, default_notes_path()?)?;

    println!(
        "{} http://{}:{}",
        "Serving docbrief on".green(),
        state.config.server_host,
        state.config.server_port
    );
    println!("{}", "Press Ctrl+C to stop".dimmed());

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    rt.block_on(server::start_server(state))
}
