//! Page geometry and normalized rectangles
//!
//! Placements travel between client and server as fractions of the page
//! size, independent of absolute point units. All normalized coordinates
//! use a top-left origin; conversion to PDF's bottom-left origin happens
//! at the lopdf boundary in the compositor.

use serde::{Deserialize, Serialize};

/// Page dimensions in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An absolute rectangle in points, top-left origin, y increasing downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl PageRect {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// A page-relative placement rectangle.
///
/// `nx`, `ny` locate the top-left corner and `nw`, `nh` the extent, all as
/// fractions of the page width/height. Well-formed output satisfies
/// `0 <= nx`, `0 <= ny`, `nx + nw <= 1`, `ny + nh <= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRect {
    /// 1-based page number.
    pub page: u32,
    pub nx: f64,
    pub ny: f64,
    pub nw: f64,
    pub nh: f64,
}

impl NormalizedRect {
    /// Normalize an absolute top-origin rectangle against a page size.
    pub fn from_page_rect(page: u32, rect: PageRect, size: PageSize) -> Self {
        Self {
            page,
            nx: rect.x0 / size.width,
            ny: rect.y0 / size.height,
            nw: rect.width() / size.width,
            nh: rect.height() / size.height,
        }
    }

    /// Resolve back to absolute top-origin points on a page of `size`.
    pub fn to_page_rect(&self, size: PageSize) -> PageRect {
        let x0 = self.nx * size.width;
        let y0 = self.ny * size.height;
        PageRect {
            x0,
            y0,
            x1: x0 + self.nw * size.width,
            y1: y0 + self.nh * size.height,
        }
    }

    pub fn is_well_formed(&self) -> bool {
        self.nx >= 0.0 && self.ny >= 0.0 && self.nx + self.nw <= 1.0 && self.ny + self.nh <= 1.0
    }
}

/// Clamp a box origin so the box stays within `[margin, limit - span - margin]`.
///
/// When the page is too small to honor the margin on both sides the lower
/// bound wins, matching the clamp order of min(max(..)).
pub fn clamp_origin(origin: f64, span: f64, limit: f64, margin: f64) -> f64 {
    origin.max(margin).min(limit - span - margin)
}

/// Fit `(src_w, src_h)` into `target` preserving aspect ratio, centered.
///
/// Returns the draw rectangle in the same (top-origin) space as `target`.
/// The anchoring is deterministic: the scaled image is centered on both
/// axes within the target box.
pub fn aspect_fit(src_w: f64, src_h: f64, target: PageRect) -> PageRect {
    let tw = target.width();
    let th = target.height();
    if src_w <= 0.0 || src_h <= 0.0 || tw <= 0.0 || th <= 0.0 {
        return target;
    }
    let scale = (tw / src_w).min(th / src_h);
    let dw = src_w * scale;
    let dh = src_h * scale;
    let x0 = target.x0 + (tw - dw) / 2.0;
    let y0 = target.y0 + (th - dh) / 2.0;
    PageRect {
        x0,
        y0,
        x1: x0 + dw,
        y1: y0 + dh,
    }
}
