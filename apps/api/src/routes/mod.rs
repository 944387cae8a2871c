pub mod draft;
pub mod health;

use axum::{
    http::StatusCode,
    routing::{get, post, put},
    Router,
};

use crate::layout::handlers as layout_handlers;
use crate::mailer::handlers as mailer_handlers;
use crate::optimize::handlers as optimize_handlers;
use crate::state::AppState;
use crate::templates::handlers as template_handlers;

/// Bare 200 for CORS preflights; the CORS layer adds the headers.
async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // AI endpoints
        .route(
            "/api/analyze-template",
            post(template_handlers::handle_analyze_template).options(preflight),
        )
        .route(
            "/api/optimize-resume",
            post(optimize_handlers::handle_optimize_resume).options(preflight),
        )
        // Layout and export
        .route("/api/layout", post(layout_handlers::handle_layout))
        .route("/api/export/plan", post(layout_handlers::handle_export_plan))
        // Drafts and delivery
        .route(
            "/api/autosave",
            get(draft::handle_get_autosave).put(draft::handle_put_autosave),
        )
        .route("/api/autosave/flush", post(draft::handle_flush_autosave))
        .route("/api/resume/:section/items", post(draft::handle_add_item))
        .route(
            "/api/resume/:section/items/:id",
            put(draft::handle_update_item).delete(draft::handle_remove_item),
        )
        .route("/api/send-email", post(mailer_handlers::handle_send_email))
        .with_state(state)
}
