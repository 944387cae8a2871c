//! Axum route handler for resume optimization.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    pub optimized: Value,
}

/// POST /api/optimize-resume
///
/// Body is the resume draft as arbitrary JSON. Responds with the optimizer's JSON.
pub async fn handle_optimize_resume(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<OptimizeResponse>, AppError> {
    let Json(resume) = payload?;
    let optimized = state.optimizer.optimize(&resume).await?;
    Ok(Json(OptimizeResponse { optimized }))
}
