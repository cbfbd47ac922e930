//! HTTP service over the analysis store and notes.
//!
//! SQLite connections are opened per request from the path in
//! [`AppState`]; extraction, summarization and database work run on the
//! blocking thread pool. Notes share one [`NoteStore`] behind a mutex.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::notes::NoteStore;
use crate::storage::Database;

mod error;
pub mod routes;

pub use error::ApiError;

/// Server state
pub struct AppState {
    pub config: Config,
    pub db_path: PathBuf,
    pub notes: Mutex<NoteStore>,
}

impl AppState {
    /// Opens the note store and makes sure the database schema exists.
    pub fn open(config: Config, db_path: PathBuf, notes_path: PathBuf) -> Result<Self> {
        Database::open(&db_path)?;
        let notes = NoteStore::open(&notes_path)
            .with_context(|| format!("Failed to open notes at {}", notes_path.display()))?;

        Ok(Self {
            config,
            db_path,
            notes: Mutex::new(notes),
        })
    }
}

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(routes::health))
        .route(
            "/analyze",
            post(routes::analyze).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/analyses", get(routes::list_analyses))
        .route(
            "/analyses/{id}",
            get(routes::get_analysis)
                .put(routes::update_analysis)
                .delete(routes::delete_analysis),
        )
        .route("/notes", get(routes::list_notes).post(routes::create_note))
        .route("/notes/tags", get(routes::note_tags))
        .route("/notes/categories", get(routes::note_categories))
        .route(
            "/notes/{id}",
            get(routes::get_note)
                .put(routes::update_note)
                .delete(routes::delete_note),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves until Ctrl+C.
pub async fn start_server(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.config.server_host, state.config.server_port);
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
