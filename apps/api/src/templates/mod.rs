// Template analysis. Returns a fixed placeholder analysis; the image itself is not
// inspected yet.

pub mod handlers;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeTemplateRequest {
    pub template_id: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateAnalysis {
    pub style: String,
    pub color_scheme: String,
    pub layout: String,
    pub recommended_for: Vec<String>,
    /// ISO-8601, UTC, millisecond precision.
    pub analysis_date: String,
}

/// The placeholder analysis, stamped with `now`.
pub fn placeholder_analysis(now: DateTime<Utc>) -> TemplateAnalysis {
    TemplateAnalysis {
        style: "modern".to_string(),
        color_scheme: "professional".to_string(),
        layout: "single-column".to_string(),
        recommended_for: vec![
            "Software Engineer".to_string(),
            "Product Manager".to_string(),
            "Designer".to_string(),
        ],
        analysis_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}
