//! Export planning: turns a rendered surface and the user's export options into the
//! exact canvas and document geometry the client-side rasterizer should produce.
//!
//! Raster formats are a single image at `scale` times the surface size. PDFs fit that
//! image to the printable width of the paper and slice it into as many pages as needed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::packer::{PageGeometry, PageLayout};

pub const PREVIEW_ELEMENT_ID: &str = "resume-preview";
const DEFAULT_FILE_STEM: &str = "resume";
/// CSS width of an A4 preview page at 96dpi.
const PREVIEW_WIDTH_PX: f32 = 794.0;
/// Fraction of a page an image may overrun before it spills onto another page.
/// 794x1123px is a hair taller than 210x297mm.
const SLICE_TOLERANCE: f32 = 0.01;

// ────────────────────────────────────────────────────────────────────────────
// Options
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Normal,
    #[default]
    High,
    Ultra,
}

impl Quality {
    pub fn scale(self) -> u32 {
        match self {
            Quality::Normal => 1,
            Quality::High => 2,
            Quality::Ultra => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PaperSize {
    /// (width, height) in millimetres, portrait.
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Margins {
    None,
    Small,
    #[default]
    Medium,
    Large,
}

impl Margins {
    pub fn mm(self) -> f32 {
        match self {
            Margins::None => 0.0,
            Margins::Small => 5.0,
            Margins::Medium => 10.0,
            Margins::Large => 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    pub quality: Quality,
    pub format: ExportFormat,
    pub paper_size: PaperSize,
    pub margins: Margins,
}

// ────────────────────────────────────────────────────────────────────────────
// Surfaces
// ────────────────────────────────────────────────────────────────────────────

/// Pixel size of a rendered element that can be exported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Surface {
    pub width_px: f32,
    pub height_px: f32,
}

/// Exportable elements by id.
#[derive(Debug, Clone, Default)]
pub struct SurfaceRegistry {
    surfaces: HashMap<String, Surface>,
}

impl SurfaceRegistry {
    pub fn insert(&mut self, element_id: impl Into<String>, surface: Surface) {
        self.surfaces.insert(element_id.into(), surface);
    }

    pub fn get(&self, element_id: &str) -> Option<Surface> {
        self.surfaces.get(element_id).copied()
    }

    /// Registers the whole preview (`resume-preview`) plus each page (`resume-page-N`).
    pub fn from_pages(pages: &[PageLayout], geometry: &PageGeometry) -> Self {
        let mut registry = Self::default();
        let page = Surface {
            width_px: PREVIEW_WIDTH_PX,
            height_px: geometry.page_height,
        };
        for layout in pages {
            registry.insert(format!("resume-page-{}", layout.page_number), page);
        }
        registry.insert(
            PREVIEW_ELEMENT_ID,
            Surface {
                width_px: PREVIEW_WIDTH_PX,
                height_px: geometry.page_height * pages.len().max(1) as f32,
            },
        );
        registry
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Planning
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq)]
pub enum ExportError {
    #[error("Element '{0}' not found")]
    ElementNotFound(String),

    #[error("Element '{0}' has no rendered area")]
    EmptySurface(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub element_id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub options: ExportOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPlan {
    pub file_name: String,
    pub format: ExportFormat,
    pub mime_type: &'static str,
    pub scale: u32,
    pub canvas_width_px: u32,
    pub canvas_height_px: u32,
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    /// Placed image size on the page (PDF only; raster exports use the canvas as-is).
    pub image_width_mm: f32,
    pub image_height_mm: f32,
    pub page_count: u32,
}

pub fn plan_export(
    request: &ExportRequest,
    surfaces: &SurfaceRegistry,
) -> Result<ExportPlan, ExportError> {
    let surface = surfaces
        .get(&request.element_id)
        .ok_or_else(|| ExportError::ElementNotFound(request.element_id.clone()))?;
    if surface.width_px <= 0.0 || surface.height_px <= 0.0 {
        return Err(ExportError::EmptySurface(request.element_id.clone()));
    }

    let options = request.options;
    let scale = options.quality.scale();
    let (page_width_mm, page_height_mm) = options.paper_size.dimensions_mm();
    let margin_mm = options.margins.mm();

    let printable_width = page_width_mm - 2.0 * margin_mm;
    let printable_height = page_height_mm - 2.0 * margin_mm;
    let image_width_mm = printable_width;
    let image_height_mm = surface.height_px * image_width_mm / surface.width_px;

    let page_count = match options.format {
        ExportFormat::Pdf => {
            let pages = image_height_mm / printable_height - SLICE_TOLERANCE;
            pages.ceil().max(1.0) as u32
        }
        ExportFormat::Png | ExportFormat::Jpeg => 1,
    };

    Ok(ExportPlan {
        file_name: with_extension(&request.file_name, options.format),
        format: options.format,
        mime_type: options.format.mime_type(),
        scale,
        canvas_width_px: (surface.width_px * scale as f32).round() as u32,
        canvas_height_px: (surface.height_px * scale as f32).round() as u32,
        page_width_mm,
        page_height_mm,
        margin_mm,
        image_width_mm,
        image_height_mm,
        page_count,
    })
}

fn with_extension(file_name: &str, format: ExportFormat) -> String {
    let stem = file_name.trim();
    let stem = if stem.is_empty() { DEFAULT_FILE_STEM } else { stem };
    let suffix = format!(".{}", format.extension());
    if stem.to_lowercase().ends_with(&suffix) {
        stem.to_string()
    } else {
        format!("{stem}{suffix}")
    }
}
