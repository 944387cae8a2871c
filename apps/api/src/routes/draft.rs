//! The server-side resume draft: debounced auto-save plus per-entry edits.
//!
//! Entry edits apply to the newest draft the saver knows about and are written
//! immediately, so a follow-up `GET /api/autosave` sees them.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::models::resume::{EntryError, ResumeData};
use crate::models::section::SectionKind;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ScheduledResponse {
    pub scheduled: bool,
}

#[derive(Debug, Serialize)]
pub struct DraftResponse {
    pub data: Option<ResumeData>,
}

#[derive(Debug, Serialize)]
pub struct FlushResponse {
    pub saved: bool,
}

#[derive(Debug, Serialize)]
pub struct ItemAddedResponse {
    pub id: String,
    pub saved: bool,
    pub data: ResumeData,
}

#[derive(Debug, Serialize)]
pub struct ItemChangedResponse {
    /// False when no entry had the requested id; the draft is unchanged then.
    pub found: bool,
    pub saved: bool,
    pub data: ResumeData,
}

fn section_kind(section: &str) -> Result<SectionKind, EntryError> {
    SectionKind::from_id(section).ok_or_else(|| EntryError::UnknownSection(section.to_string()))
}

/// PUT /api/autosave
///
/// Restarts the debounce timer with this draft; the write happens once edits go quiet.
pub async fn handle_put_autosave(
    State(state): State<AppState>,
    payload: Result<Json<ResumeData>, JsonRejection>,
) -> Result<Json<ScheduledResponse>, AppError> {
    let Json(data) = payload?;
    let scheduled = state.autosaver.schedule(&data);
    Ok(Json(ScheduledResponse { scheduled }))
}

/// GET /api/autosave
pub async fn handle_get_autosave(State(state): State<AppState>) -> Json<DraftResponse> {
    Json(DraftResponse {
        data: state.autosaver.load().await,
    })
}

/// POST /api/autosave/flush
pub async fn handle_flush_autosave(State(state): State<AppState>) -> Json<FlushResponse> {
    Json(FlushResponse {
        saved: state.autosaver.flush().await,
    })
}

/// POST /api/resume/:section/items
pub async fn handle_add_item(
    State(state): State<AppState>,
    Path(section): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ItemAddedResponse>, AppError> {
    let Json(item) = payload?;
    let kind = section_kind(&section)?;

    let mut data = state.autosaver.latest().await.unwrap_or_default();
    let id = data.add_item(kind, item)?;
    let saved = state.autosaver.save_now(&data).await;
    info!(section = %section, id = %id, "Draft entry added");
    Ok(Json(ItemAddedResponse { id, saved, data }))
}

/// PUT /api/resume/:section/items/:id
pub async fn handle_update_item(
    State(state): State<AppState>,
    Path((section, id)): Path<(String, String)>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ItemChangedResponse>, AppError> {
    let Json(item) = payload?;
    let kind = section_kind(&section)?;

    let mut data = state.autosaver.latest().await.unwrap_or_default();
    let found = data.update_item(kind, &id, item)?;
    let saved = found && state.autosaver.save_now(&data).await;
    Ok(Json(ItemChangedResponse { found, saved, data }))
}

/// DELETE /api/resume/:section/items/:id
pub async fn handle_remove_item(
    State(state): State<AppState>,
    Path((section, id)): Path<(String, String)>,
) -> Result<Json<ItemChangedResponse>, AppError> {
    let kind = section_kind(&section)?;

    let mut data = state.autosaver.latest().await.unwrap_or_default();
    let found = data.remove_item(kind, &id)?;
    let saved = found && state.autosaver.save_now(&data).await;
    Ok(Json(ItemChangedResponse { found, saved, data }))
}
