//! Static section-height heuristics.
//!
//! Heights are in CSS pixels at 96dpi and come from a fixed table rather than a render
//! pass. They ignore text wrapping, font metrics, and the length of free text, so they
//! are an approximation only: good enough to place page breaks in the preview, never
//! to be treated as the exact rendered height. `TextMetricsRenderer` in `measure.rs`
//! gives a closer estimate when the real text matters.

use crate::models::resume::ResumeData;
use crate::models::section::SectionKind;

/// Section title plus the spacing around it.
pub const BASE_HEIGHT: f32 = 80.0;

/// Height added per entry for repeated-entry sections.
pub fn per_item_height(kind: SectionKind) -> Option<f32> {
    match kind {
        SectionKind::Experience => Some(160.0),
        SectionKind::Projects => Some(180.0),
        SectionKind::Education => Some(120.0),
        SectionKind::Achievements => Some(60.0),
        SectionKind::Certifications => Some(80.0),
        SectionKind::VolunteerExperience => Some(140.0),
        SectionKind::Publications => Some(100.0),
        SectionKind::References => Some(160.0),
        _ => None,
    }
}

/// Flat body height for sections whose size does not depend on an entry count.
fn fixed_body_height(kind: SectionKind) -> f32 {
    match kind {
        SectionKind::PersonalStatement | SectionKind::Summary | SectionKind::Skills => 100.0,
        SectionKind::Interests | SectionKind::Languages => 80.0,
        _ => 0.0,
    }
}

/// Estimated rendered height of one section.
///
/// Pure: reads only the entry count of the section being estimated, so edits to any
/// other section never move this one's estimate. Unknown ids get `BASE_HEIGHT`.
pub fn estimate_section_height(section_id: &str, data: &ResumeData) -> f32 {
    let Some(kind) = SectionKind::from_id(section_id) else {
        return BASE_HEIGHT;
    };

    match per_item_height(kind) {
        Some(per_item) => BASE_HEIGHT + data.item_count(kind) as f32 * per_item,
        None => BASE_HEIGHT + fixed_body_height(kind),
    }
}
