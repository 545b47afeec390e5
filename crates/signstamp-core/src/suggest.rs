//! Placement suggestion engine
//!
//! For every page, exactly one detection tier contributes suggestions.
//! Tier order is strict priority: existing signature widgets, then keyword
//! labels, then a bottom-right fallback box. A page always produces at
//! least one suggestion, and only the widget tier may produce more than
//! one.

use crate::document::{SignDocument, DEFAULT_PAGE_SIZE};
use crate::geometry::{clamp_origin, NormalizedRect, PageRect, PageSize};
use crate::text::find_text;
use crate::widgets::signature_widget_rects;

/// Tunables for the suggestion tiers.
#[derive(Debug, Clone)]
pub struct SuggestConfig {
    /// Label keywords in priority order; the first keyword with a match on
    /// a page wins that page.
    pub keywords: Vec<String>,
    /// Default suggestion box size in points.
    pub box_width: f64,
    pub box_height: f64,
    /// Minimum distance kept between a keyword-derived box and the page
    /// edges.
    pub margin: f64,
    /// Horizontal gap between a matched label and the box placed after it.
    pub label_gap: f64,
    /// Fraction of the box height the box is raised above the label's top
    /// edge, roughly centering it on the text line.
    pub baseline_factor: f64,
    /// Distance of the fallback box from the bottom-right page corner.
    pub fallback_offset: f64,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            keywords: ["Unterschrift", "Signatur", "Signature", "Datum", "Ort"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            box_width: 160.0,
            box_height: 45.0,
            margin: 14.0,
            label_gap: 8.0,
            baseline_factor: 0.4,
            fallback_offset: 36.0,
        }
    }
}

/// Propose signature placements for every page of `doc`, in ascending page
/// order. Never fails for a parsed document; per-page detection failures
/// degrade to the next tier.
pub fn suggest(doc: &SignDocument, config: &SuggestConfig) -> Vec<NormalizedRect> {
    let mut suggestions = Vec::new();
    for page in doc.page_numbers() {
        let size = doc.page_size(page).unwrap_or(DEFAULT_PAGE_SIZE);

        let mut found = widget_tier(doc, page, size);
        if found.is_empty() {
            found = keyword_tier(doc, page, size, config).into_iter().collect();
        }
        if found.is_empty() {
            found.push(fallback_tier(page, size, config));
        }
        suggestions.extend(found);
    }
    suggestions
}

pub fn suggest_with_defaults(doc: &SignDocument) -> Vec<NormalizedRect> {
    suggest(doc, &SuggestConfig::default())
}

/// Tier 1: every signature widget on the page becomes a suggestion.
fn widget_tier(doc: &SignDocument, page: u32, size: PageSize) -> Vec<NormalizedRect> {
    signature_widget_rects(doc, page, size)
        .into_iter()
        .map(|rect| clamp_to_page(NormalizedRect::from_page_rect(page, rect, size)))
        .collect()
}

/// Tier 2: the first keyword with any match contributes one box, derived
/// from its first match and clamped inside the page margins.
fn keyword_tier(
    doc: &SignDocument,
    page: u32,
    size: PageSize,
    config: &SuggestConfig,
) -> Option<NormalizedRect> {
    let box_w = config.box_width.min(size.width);
    let box_h = config.box_height.min(size.height);
    for keyword in &config.keywords {
        if let Some(r) = find_text(doc, page, keyword, size).into_iter().next() {
            let x = clamp_origin(r.x1 + config.label_gap, box_w, size.width, config.margin);
            let y = clamp_origin(
                r.y0 - box_h * config.baseline_factor,
                box_h,
                size.height,
                config.margin,
            );
            let rect = PageRect {
                x0: x,
                y0: y,
                x1: x + box_w,
                y1: y + box_h,
            };
            return Some(clamp_to_page(NormalizedRect::from_page_rect(
                page, rect, size,
            )));
        }
    }
    None
}

/// Tier 3: default box anchored to the bottom-right corner.
fn fallback_tier(page: u32, size: PageSize, config: &SuggestConfig) -> NormalizedRect {
    let box_w = config.box_width.min(size.width);
    let box_h = config.box_height.min(size.height);
    let x = (size.width - box_w - config.fallback_offset).max(0.0);
    let y = (size.height - box_h - config.fallback_offset).max(0.0);
    let rect = PageRect {
        x0: x,
        y0: y,
        x1: x + box_w,
        y1: y + box_h,
    };
    clamp_to_page(NormalizedRect::from_page_rect(page, rect, size))
}

/// Force the well-formedness invariant on an emitted rectangle.
fn clamp_to_page(mut rect: NormalizedRect) -> NormalizedRect {
    rect.nw = rect.nw.clamp(0.0, 1.0);
    rect.nh = rect.nh.clamp(0.0, 1.0);
    rect.nx = rect.nx.clamp(0.0, 1.0 - rect.nw);
    rect.ny = rect.ny.clamp(0.0, 1.0 - rect.nh);
    rect
}
