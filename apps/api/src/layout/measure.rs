//! Section measurement.
//!
//! `Renderer` is the single seam between the packer and whatever knows how tall a
//! section really is. The browser preview measures real DOM nodes; on the server we
//! have the static height table (`HeuristicRenderer`) and a text-metrics estimator
//! that word-wraps the section's actual text (`TextMetricsRenderer`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::layout::font_metrics::{get_metrics, FontFamily};
use crate::layout::heights::estimate_section_height;
use crate::models::resume::ResumeData;
use crate::models::section::SectionKind;

/// Anything that can report the rendered pixel height of one resume section.
pub trait Renderer: Send + Sync {
    fn measure(&self, section_id: &str, data: &ResumeData) -> f32;

    /// Height when the content column is `content_width_px` wide. Renderers whose
    /// output does not depend on width keep the default.
    fn measure_at_width(&self, section_id: &str, data: &ResumeData, content_width_px: f32) -> f32 {
        let _ = content_width_px;
        self.measure(section_id, data)
    }
}

/// Static table lookup. See `heights.rs` for the table and its limits.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicRenderer;

impl Renderer for HeuristicRenderer {
    fn measure(&self, section_id: &str, data: &ResumeData) -> f32 {
        estimate_section_height(section_id, data)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Text-metrics renderer
// ────────────────────────────────────────────────────────────────────────────

/// Typography the text-metrics renderer lays text out with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    pub font: FontFamily,
    pub font_size_px: f32,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    /// Width of the content column (page width minus horizontal padding).
    pub content_width_px: f32,
    /// Section title plus the gap under it.
    pub title_height_px: f32,
    /// Vertical gap between entries of a repeated section.
    pub entry_gap_px: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: FontFamily::Inter,
            font_size_px: 14.0,
            line_height: 1.5,
            // A4 is 794px wide at 96dpi, minus 48px padding either side.
            content_width_px: 698.0,
            title_height_px: 48.0,
            entry_gap_px: 16.0,
        }
    }
}

/// Headless estimator: wraps each block of real text and converts lines to pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextMetricsRenderer {
    pub style: TextStyle,
}

impl TextMetricsRenderer {
    pub fn new(style: TextStyle) -> Self {
        Self { style }
    }

    fn line_px(&self) -> f32 {
        self.style.font_size_px * self.style.line_height
    }

    fn lines(&self, text: &str, width_px: f32) -> usize {
        let width_em = width_px / self.style.font_size_px;
        get_metrics(self.style.font).wrapped_lines(text, width_em)
    }

    fn blocks_height<'a>(&self, blocks: impl IntoIterator<Item = &'a str>, width_px: f32) -> f32 {
        let lines: usize = blocks.into_iter().map(|b| self.lines(b, width_px)).sum();
        lines as f32 * self.line_px()
    }

    /// `title_height_px` covers a one-line title; each extra wrapped line adds a line.
    fn title_height(&self, kind: SectionKind, width_px: f32) -> f32 {
        let extra = self.lines(kind.title(), width_px).saturating_sub(1);
        self.style.title_height_px + extra as f32 * self.line_px()
    }
}

impl Renderer for TextMetricsRenderer {
    fn measure(&self, section_id: &str, data: &ResumeData) -> f32 {
        self.measure_at_width(section_id, data, self.style.content_width_px)
    }

    fn measure_at_width(&self, section_id: &str, data: &ResumeData, width: f32) -> f32 {
        let Some(kind) = SectionKind::from_id(section_id) else {
            return self.style.title_height_px;
        };

        let body: f32 = match kind {
            SectionKind::PersonalStatement => {
                self.blocks_height([data.personal_statement.as_str()], width)
            }
            SectionKind::Summary => self.blocks_height([data.summary.as_str()], width),
            SectionKind::Skills => self.blocks_height([data.skills.join(", ").as_str()], width),
            SectionKind::Interests => {
                self.blocks_height([data.interests.join(", ").as_str()], width)
            }
            SectionKind::Languages => {
                self.blocks_height([data.languages.join(", ").as_str()], width)
            }
            _ => data
                .entry_blocks(kind)
                .into_iter()
                .map(|entry| self.blocks_height(entry, width) + self.style.entry_gap_px)
                .sum(),
        };
        self.title_height(kind, width) + body
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Session cache
// ────────────────────────────────────────────────────────────────────────────

/// Measured heights for one layout session, keyed by section id.
///
/// Not shared between sessions; whoever owns the session decides when it goes stale.
#[derive(Debug, Clone, Default)]
pub struct MeasurementCache {
    heights: HashMap<String, f32>,
}

impl MeasurementCache {
    pub fn get_or_measure(&mut self, section_id: &str, measure: impl FnOnce() -> f32) -> f32 {
        if let Some(height) = self.heights.get(section_id) {
            return *height;
        }
        let height = measure();
        self.heights.insert(section_id.to_string(), height);
        height
    }

    pub fn get(&self, section_id: &str) -> Option<f32> {
        self.heights.get(section_id).copied()
    }

    pub fn clear(&mut self) {
        self.heights.clear();
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Deferred measurement
// ────────────────────────────────────────────────────────────────────────────

/// Owner side of a cancellable measurement. Dropping it cancels every pending one.
#[derive(Debug)]
pub struct MeasureCancel {
    tx: watch::Sender<bool>,
}

impl MeasureCancel {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn token(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for MeasureCancel {
    fn default() -> Self {
        Self::new()
    }
}

/// Measures a section after yielding one scheduling tick.
///
/// Resolves to `None` if the measurement is cancelled, or its `MeasureCancel` dropped,
/// before the tick completes. A pending measurement never outlives its owner.
pub async fn measure_deferred(
    renderer: &dyn Renderer,
    section_id: &str,
    data: &ResumeData,
    mut cancel: watch::Receiver<bool>,
) -> Option<f32> {
    if *cancel.borrow() {
        return None;
    }

    tokio::select! {
        biased;
        _ = cancel.changed() => None,
        _ = tokio::task::yield_now() => {
            if *cancel.borrow() {
                None
            } else {
                Some(renderer.measure(section_id, data))
            }
        }
    }
}
