//! Greedy page packer: assigns visible sections to fixed-height print pages.
//!
//! Sections are never split across pages. Each section goes on the current page if it
//! fits, otherwise a new page is opened first. A page that has no sections yet always
//! accepts the next one, so a single oversized section lands alone on its own page
//! instead of being dropped or spinning up empty pages.
//!
//! The packer is a pure function of (descriptors, geometry). Heights come from a
//! `Renderer`, so the heuristic table and real measurements share the same code path.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::layout::measure::Renderer;
use crate::models::resume::ResumeData;

// ────────────────────────────────────────────────────────────────────────────
// Geometry
// ────────────────────────────────────────────────────────────────────────────

/// A4 at 96dpi.
pub const A4_HEIGHT_PX: f32 = 1123.0;
/// Padding applied to both the top and bottom of every page.
pub const PAGE_PADDING: f32 = 48.0;
/// Height reserved for the personal-info header on page 1.
pub const HEADER_HEIGHT: f32 = 200.0;
pub const SECTION_SPACING: f32 = 32.0;
/// Starting offset on continuation pages.
pub const CONTINUATION_TOP_MARGIN: f32 = 32.0;

/// Page dimensions and spacing used by the packer, all in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    pub page_height: f32,
    pub page_padding: f32,
    pub header_height: f32,
    pub section_spacing: f32,
    pub top_margin: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page_height: A4_HEIGHT_PX,
            page_padding: PAGE_PADDING,
            header_height: HEADER_HEIGHT,
            section_spacing: SECTION_SPACING,
            top_margin: CONTINUATION_TOP_MARGIN,
        }
    }
}

impl PageGeometry {
    /// Height available to content on one page. 1027px for the A4 defaults.
    pub fn usable_height(&self) -> f32 {
        self.page_height - 2.0 * self.page_padding
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDescriptor {
    pub id: String,
    pub estimated_height: f32,
    /// Always false today: sections move to the next page whole.
    pub can_split: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLayout {
    /// 1-based.
    pub page_number: u32,
    pub sections: Vec<SectionDescriptor>,
    /// Running height: header or top margin, plus each section's height and spacing.
    pub total_height: f32,
    pub has_header: bool,
}

impl PageLayout {
    fn first(geometry: &PageGeometry) -> Self {
        Self {
            page_number: 1,
            sections: Vec::new(),
            total_height: geometry.header_height,
            has_header: true,
        }
    }

    fn continuation(page_number: u32, geometry: &PageGeometry) -> Self {
        Self {
            page_number,
            sections: Vec::new(),
            total_height: geometry.top_margin,
            has_header: false,
        }
    }
}

/// A "page ends here" marker for the live preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageBreak {
    /// The page that ends at this marker.
    pub page_number: u32,
    pub after_section: String,
    pub before_section: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Packing
// ────────────────────────────────────────────────────────────────────────────

/// Packs sections into pages in input order.
///
/// Always returns at least one page; empty input yields page 1 with no sections.
pub fn pack_sections(sections: &[SectionDescriptor], geometry: &PageGeometry) -> Vec<PageLayout> {
    let usable = geometry.usable_height();
    let mut pages: Vec<PageLayout> = Vec::new();
    let mut current = PageLayout::first(geometry);

    for section in sections {
        let needed = section.estimated_height + geometry.section_spacing;

        if current.total_height + needed > usable && !current.sections.is_empty() {
            let next = PageLayout::continuation(current.page_number + 1, geometry);
            pages.push(std::mem::replace(&mut current, next));
        }

        if needed > usable {
            debug!(
                section = %section.id,
                height = section.estimated_height,
                usable,
                "Section taller than a page, placing it alone"
            );
        }

        current.total_height += needed;
        current.sections.push(section.clone());
    }

    if !current.sections.is_empty() || pages.is_empty() {
        pages.push(current);
    }

    debug!(
        sections = sections.len(),
        pages = pages.len(),
        "Packed resume sections"
    );
    pages
}

/// Measures every visible section of `data` with `renderer` and packs the result.
///
/// Duplicate ids in the section config are laid out once, at their first position.
pub fn build_page_layout(
    data: &ResumeData,
    renderer: &dyn Renderer,
    geometry: &PageGeometry,
) -> Vec<PageLayout> {
    let descriptors = describe_sections(data, |id| renderer.measure(id, data));
    pack_sections(&descriptors, geometry)
}

/// Builds one descriptor per unique visible section id, measuring each with `measure`.
pub fn describe_sections(
    data: &ResumeData,
    mut measure: impl FnMut(&str) -> f32,
) -> Vec<SectionDescriptor> {
    let mut seen = HashSet::new();
    let mut descriptors = Vec::new();

    for id in data.visible_section_ids() {
        if !seen.insert(id.clone()) {
            warn!(section = %id, "Duplicate section id in config, skipping");
            continue;
        }
        let estimated_height = measure(&id).max(0.0);
        descriptors.push(SectionDescriptor {
            id,
            estimated_height,
            can_split: false,
        });
    }
    descriptors
}

/// Page-break markers derived from the packed pages.
///
/// This is the only place the preview learns where pages end, so the markers always
/// agree with the packer.
pub fn page_breaks(pages: &[PageLayout]) -> Vec<PageBreak> {
    pages
        .windows(2)
        .filter_map(|pair| {
            let after = pair[0].sections.last()?;
            let before = pair[1].sections.first()?;
            Some(PageBreak {
                page_number: pair[0].page_number,
                after_section: after.id.clone(),
                before_section: before.id.clone(),
            })
        })
        .collect()
}
