use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Service version plus which upstream integrations are configured.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let config = &state.config;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "vitae-api",
        "llm": {
            "configured": config.openai_api_key.is_some(),
            "model": config.openai_model,
        },
        "email": { "configured": config.email_api_key.is_some() },
    }))
}
