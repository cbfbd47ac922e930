use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::analyze::Analyzer;
use crate::notes::{LabelCount, NewNote, Note, NoteFilter, NoteUpdate};
use crate::server::{ApiError, AppState};
use crate::storage::{Analysis, Database, SummarySource};

const DEFAULT_LIST_LIMIT: usize = 50;
const MAX_LIST_LIMIT: usize = 500;

#[derive(Deserialize)]
pub struct AnalysisParams {
    pub q: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct SummaryUpdate {
    pub summary: String,
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Stages the uploaded `file` field in a temporary file, analyzes it and
/// stores the result.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Analysis>), ApiError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = upload_name(field.file_name());
        let data = field.bytes().await?;
        upload = Some((filename, data));
    }

    let (filename, data) = upload
        .ok_or_else(|| ApiError::BadRequest("Missing file field 'file'".to_string()))?;
    tracing::info!("Analyzing upload {} ({} bytes)", filename, data.len());

    let config = state.config.clone();
    let db_path = state.db_path.clone();
    let analysis = tokio::task::spawn_blocking(move || -> anyhow::Result<Analysis> {
        // Removed from disk when dropped at the end of this closure.
        let mut staged = tempfile::NamedTempFile::new().context("Failed to stage upload")?;
        staged.write_all(&data)?;
        staged.flush()?;

        let analysis = Analyzer::from_config(&config).analyze_file(staged.path(), &filename);
        Database::open(&db_path)?.insert_analysis(&analysis)?;
        Ok(analysis)
    })
    .await??;

    Ok((StatusCode::CREATED, Json(analysis)))
}

/// Keeps only the final path component of a client-supplied file name.
fn upload_name(raw: Option<&str>) -> String {
    raw.and_then(|name| name.rsplit(['/', '\\']).next())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("upload")
        .to_string()
}

pub async fn list_analyses(
    State(state): State<Arc<AppState>>,
    params: Result<Query<AnalysisParams>, QueryRejection>,
) -> Result<Json<Vec<Analysis>>, ApiError> {
    let Query(params) = params?;
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    let query = params.q.unwrap_or_default();

    let analyses = with_db(&state, move |db| db.search_analyses(&query, limit)).await?;
    Ok(Json(analyses))
}

pub async fn get_analysis(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Analysis>, ApiError> {
    let id = parse_id(&id)?;
    with_db(&state, move |db| db.get_analysis(&id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Analysis not found: {id}")))
}

/// Replaces the summary with user-written text.
pub async fn update_analysis(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<SummaryUpdate>, JsonRejection>,
) -> Result<Json<Analysis>, ApiError> {
    let id = parse_id(&id)?;
    let Json(body) = body?;
    let summary = body.summary.trim().to_string();
    if summary.is_empty() {
        return Err(ApiError::BadRequest("Summary cannot be empty".to_string()));
    }

    with_db(&state, move |db| {
        if !db.update_summary(&id, &summary, SummarySource::Manual)? {
            return Ok(None);
        }
        db.get_analysis(&id)
    })
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::NotFound(format!("Analysis not found: {id}")))
}

pub async fn delete_analysis(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    if with_db(&state, move |db| db.delete_analysis(&id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Analysis not found: {id}")))
    }
}

pub async fn list_notes(
    State(state): State<Arc<AppState>>,
    filter: Result<Query<NoteFilter>, QueryRejection>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let Query(filter) = filter?;
    Ok(Json(state.notes.lock().await.list(&filter)))
}

pub async fn create_note(
    State(state): State<Arc<AppState>>,
    new: Result<Json<NewNote>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let Json(new) = new?;
    let note = state.notes.lock().await.create(new)?;
    tracing::info!("Created note {}", note.short_id());
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn get_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_id(&id)?;
    state
        .notes
        .lock()
        .await
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Note not found: {id}")))
}

pub async fn update_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    update: Result<Json<NoteUpdate>, JsonRejection>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_id(&id)?;
    let Json(update) = update?;
    let note = state.notes.lock().await.update(&id, update)?;
    Ok(Json(note))
}

pub async fn delete_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    if state.notes.lock().await.delete(&id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Note not found: {id}")))
    }
}

pub async fn note_tags(State(state): State<Arc<AppState>>) -> Json<Vec<LabelCount>> {
    Json(state.notes.lock().await.tags())
}

pub async fn note_categories(State(state): State<Arc<AppState>>) -> Json<Vec<LabelCount>> {
    Json(state.notes.lock().await.categories())
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::BadRequest(format!("Invalid id: '{raw}'")))
}

/// Runs `f` against a fresh connection on the blocking pool.
async fn with_db<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let path = state.db_path.clone();
    let value = tokio::task::spawn_blocking(move || {
        let db = Database::open(&path)?;
        f(&db)
    })
    .await??;
    Ok(value)
}
