//! PDF signature placement engine
//!
//! Two components operating on an owned document handle:
//!
//! - `suggest`: scan a PDF for signature targets (existing signature
//!   widgets, keyword labels, or a fallback corner) and emit normalized
//!   placement rectangles, one detection attempt per page.
//! - `composite`: burn a raster signature image into user-confirmed page
//!   regions, aspect-preserved, and serialize the mutated document.
//!
//! HTTP routing, upload handling, and token storage live in the
//! `signstamp-api` crate; this crate is pure placement logic over lopdf.

pub mod composite;
pub mod document;
pub mod error;
pub mod geometry;
pub mod suggest;

mod text;
mod widgets;

#[cfg(test)]
mod test_fixtures;

pub use composite::{composite, SignatureImage};
pub use document::{is_pdf_candidate, SignDocument};
pub use error::PlacementError;
pub use geometry::{NormalizedRect, PageRect, PageSize};
pub use suggest::{suggest, suggest_with_defaults, SuggestConfig};
