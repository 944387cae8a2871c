use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::export::ExportError;
use crate::llm_client::LlmError;
use crate::mailer::MailError;
use crate::models::resume::EntryError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant renders as HTTP 500 with `{ "error": "<message>" }`; callers tell
/// failures apart by the message, not the status.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Draft error: {0}")]
    Entry(#[from] EntryError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Email error: {0}")]
    Mail(#[from] MailError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::InvalidBody(msg) => tracing::warn!("Rejected request body: {msg}"),
            AppError::Llm(e) => tracing::error!("LLM error: {e}"),
            AppError::Entry(e) => tracing::warn!("Draft error: {e}"),
            AppError::Export(e) => tracing::warn!("Export error: {e}"),
            AppError::Mail(e) => tracing::error!("Email error: {e}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
        }

        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::InvalidBody(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_every_error_is_a_500_envelope() {
        let response = AppError::Llm(LlmError::MissingApiKey).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "LLM error: OPENAI_API_KEY is not configured");
    }

    #[tokio::test]
    async fn test_export_error_message() {
        let response =
            AppError::Export(ExportError::ElementNotFound("resume-preview".to_string()))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(
            body["error"],
            "Export error: Element 'resume-preview' not found"
        );
    }
}
