use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::mailer::EmailMessage;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    pub success: bool,
    pub id: String,
}

/// POST /api/send-email
pub async fn handle_send_email(
    State(state): State<AppState>,
    payload: Result<Json<EmailMessage>, JsonRejection>,
) -> Result<Json<SendEmailResponse>, AppError> {
    let Json(message) = payload?;
    let id = state.mailer.send(&message).await?;
    Ok(Json(SendEmailResponse { success: true, id }))
}
