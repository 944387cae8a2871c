//! Axum route handlers for layout estimation and export planning.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::export::{plan_export, ExportPlan, ExportRequest, SurfaceRegistry};
use crate::layout::{
    HeuristicRenderer, LayoutSession, PageBreak, PageGeometry, PageLayout, Renderer,
    TextMetricsRenderer, TextStyle,
};
use crate::models::resume::ResumeData;
use crate::state::AppState;

/// Which renderer measures the sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeasurementMode {
    #[default]
    Heuristic,
    TextMetrics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRequest {
    pub data: ResumeData,
    #[serde(default)]
    pub measurement: MeasurementMode,
    /// Only read by the text-metrics renderer.
    #[serde(default)]
    pub style: Option<TextStyle>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResponse {
    pub pages: Vec<PageLayout>,
    pub page_breaks: Vec<PageBreak>,
    pub exceeds_single_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPlanRequest {
    #[serde(flatten)]
    pub layout: LayoutRequest,
    #[serde(flatten)]
    pub export: ExportRequest,
}

fn renderer_for(mode: MeasurementMode, style: Option<TextStyle>) -> Box<dyn Renderer> {
    match mode {
        MeasurementMode::Heuristic => Box::new(HeuristicRenderer),
        MeasurementMode::TextMetrics => {
            Box::new(TextMetricsRenderer::new(style.unwrap_or_default()))
        }
    }
}

/// Runs one layout pass in a throwaway session.
pub fn lay_out(request: &LayoutRequest, geometry: PageGeometry) -> LayoutResponse {
    let mut session = LayoutSession::new(
        renderer_for(request.measurement, request.style),
        geometry,
    );
    session.recompute(&request.data);
    LayoutResponse {
        pages: session.pages().to_vec(),
        page_breaks: session.page_breaks(),
        exceeds_single_page: session.exceeds_single_page(),
    }
}

/// POST /api/layout
pub async fn handle_layout(
    State(state): State<AppState>,
    payload: Result<Json<LayoutRequest>, JsonRejection>,
) -> Result<Json<LayoutResponse>, AppError> {
    let Json(request) = payload?;
    let response = lay_out(&request, state.page_geometry);
    info!(
        pages = response.pages.len(),
        measurement = ?request.measurement,
        "Layout computed"
    );
    Ok(Json(response))
}

/// POST /api/export/plan
///
/// Lays the resume out first so the page surfaces (`resume-preview`, `resume-page-N`)
/// exist, then plans the export of the requested element.
pub async fn handle_export_plan(
    State(state): State<AppState>,
    payload: Result<Json<ExportPlanRequest>, JsonRejection>,
) -> Result<Json<ExportPlan>, AppError> {
    let Json(request) = payload?;
    let layout = lay_out(&request.layout, state.page_geometry);
    let surfaces = SurfaceRegistry::from_pages(&layout.pages, &state.page_geometry);
    let plan = plan_export(&request.export, &surfaces)?;
    info!(
        element = %request.export.element_id,
        file = %plan.file_name,
        pages = plan.page_count,
        "Export planned"
    );
    Ok(Json(plan))
}
