//! Axum route handler for template analysis.

use axum::{extract::rejection::JsonRejection, Json};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::templates::{placeholder_analysis, AnalyzeTemplateRequest, TemplateAnalysis};

#[derive(Debug, Serialize)]
pub struct AnalyzeTemplateResponse {
    pub success: bool,
    pub analysis: TemplateAnalysis,
    pub message: String,
}

/// POST /api/analyze-template
pub async fn handle_analyze_template(
    payload: Result<Json<AnalyzeTemplateRequest>, JsonRejection>,
) -> Result<Json<AnalyzeTemplateResponse>, AppError> {
    let Json(request) = payload?;
    info!(
        template_id = %request.template_id,
        image_url = %request.image_url,
        "Analyzing template"
    );

    Ok(Json(AnalyzeTemplateResponse {
        success: true,
        analysis: placeholder_analysis(Utc::now()),
        message: "Template analyzed successfully".to_string(),
    }))
}
