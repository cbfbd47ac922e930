use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docbrief::cli::commands;

/// The main CLI command line interface.
#[derive(Parser)]
#[command(name = "docbrief")]
#[command(version)]
#[command(about = "Extract, summarize and keep notes on documents")]
#[command(long_about = "docbrief extracts the text of documents, picks out their keywords\n\
    and writes a short summary, using an LLM provider when one is configured\n\
    and a local summary otherwise. Results are stored in a local database\n\
    alongside a simple collection of notes, and can be served over HTTP.")]
#[command(after_help = "EXAMPLES:\n    \
    docbrief analyze report.md       Analyze and store a document\n    \
    docbrief list                    List stored analyses\n    \
    docbrief show abc123             View an analysis\n    \
    docbrief search invoice          Search analyses for text\n    \
    docbrief note add \"Follow up\"    Create a note\n    \
    docbrief serve                   Start the HTTP service\n\n\
    Data lives in ~/.docbrief unless DOCBRIEF_HOME is set.\n\
    For more information about a command, run 'docbrief <command> --help'.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Analyze documents and store the results
    #[command(long_about = "Extracts text from each file, counts keywords and writes a\n\
        summary. Unsupported or unreadable files are stored with a\n\
        placeholder summary instead of failing.")]
    Analyze(commands::analyze::Args),

    /// List stored analyses
    List(commands::list::Args),

    /// Show an analysis
    Show(commands::show::Args),

    /// Search analyses by file name, summary, text or keyword
    Search(commands::search::Args),

    /// View, replace or regenerate a summary
    Summarize(commands::summarize::Args),

    /// Permanently delete an analysis
    Delete(commands::delete::Args),

    /// Create, list and edit notes
    Note(commands::note::Args),

    /// View and manage configuration settings
    #[command(long_about = "Provides subcommands to show, get, and set configuration values.\n\
        Configuration is stored in ~/.docbrief/config.yaml.")]
    Config(commands::config::Args),

    /// Run the HTTP service
    #[command(long_about = "Serves the analysis and note API over HTTP until interrupted.\n\
        Documents are uploaded to POST /analyze as multipart field 'file'.")]
    Serve(commands::serve::Args),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "docbrief=debug"
    } else {
        "docbrief=info"
    };

    let (log_writer, _guard) = match &cli.command {
        Commands::Serve(commands::serve::Args {
            log_file: Some(path),
            ..
        }) => {
            let (writer, guard) = file_writer(path)?;
            (Some(writer), Some(guard))
        }
        _ => (None, None),
    };
    let file_layer = log_writer.map(|writer| {
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    match cli.command {
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::List(args) => commands::list::run(args),
        Commands::Show(args) => commands::show::run(args),
        Commands::Search(args) => commands::search::run(args),
        Commands::Summarize(args) => commands::summarize::run(args),
        Commands::Delete(args) => commands::delete::run(args),
        Commands::Note(args) => commands::note::run(args),
        Commands::Config(args) => commands::config::run(args),
        Commands::Serve(args) => commands::serve::run(args),
    }
}

/// A non-blocking writer appending to `path`. The guard must outlive the
/// server so buffered lines are flushed.
fn file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    let Some(file_name) = path.file_name() else {
        bail!("Log file path has no file name: {}", path.display());
    };
    if path.is_dir() {
        bail!("Log file path is a directory: {}", path.display());
    }
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    // `rolling::never` panics when it cannot open the file.
    let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(tracing_appender::rolling::Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    Ok(tracing_appender::non_blocking(file_appender))
}
