//! Owned handle over a parsed PDF document
//!
//! Wraps `lopdf::Document` behind the narrow surface the placement engine
//! needs: page lookup, effective page sizes, and serialization. The handle
//! is owned by one request and passed by value into the compositor, so a
//! document is never mutated through a shared reference.

use std::collections::BTreeMap;

use lopdf::{Document, Object, ObjectId};

use crate::error::PlacementError;
use crate::geometry::PageSize;

/// Cheap pre-filter used before handing bytes to the parser. Accepts any
/// byte stream whose first 4 bytes are the `%PDF` marker; structural
/// validity is established by actually parsing.
pub fn is_pdf_candidate(data: &[u8]) -> bool {
    data.len() > 4 && &data[0..4] == b"%PDF"
}

/// Page size assumed when a page carries no resolvable MediaBox (US
/// Letter).
pub(crate) const DEFAULT_PAGE_SIZE: PageSize = PageSize {
    width: 612.0,
    height: 792.0,
};

/// An owned, single-writer PDF document.
#[derive(Debug)]
pub struct SignDocument {
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
}

impl SignDocument {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PlacementError> {
        let doc =
            Document::load_mem(bytes).map_err(|e| PlacementError::ParseError(e.to_string()))?;
        let pages = doc.get_pages();
        Ok(Self { doc, pages })
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// 1-based page numbers in ascending order.
    pub fn page_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.keys().copied()
    }

    pub(crate) fn page_object_id(&self, page: u32) -> Option<ObjectId> {
        self.pages.get(&page).copied()
    }

    pub(crate) fn doc(&self) -> &Document {
        &self.doc
    }

    pub(crate) fn doc_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Effective page size from the MediaBox, resolving inherited entries
    /// through the `Parent` chain.
    pub fn page_size(&self, page: u32) -> Option<PageSize> {
        let page_id = self.page_object_id(page)?;
        let mut current = Some(page_id);
        while let Some(id) = current {
            let dict = self.doc.get_object(id).and_then(|o| o.as_dict()).ok()?;
            if let Some(size) = media_box_size(&self.doc, dict) {
                return Some(size);
            }
            current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok();
        }
        None
    }

    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, PlacementError> {
        let mut output = Vec::new();
        self.doc
            .save_to(&mut output)
            .map_err(|e| PlacementError::CompositingError(e.to_string()))?;
        Ok(output)
    }
}

fn media_box_size(doc: &Document, dict: &lopdf::Dictionary) -> Option<PageSize> {
    let raw = dict.get(b"MediaBox").ok()?;
    let arr = resolve(doc, raw).as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let llx = object_to_f64(&arr[0])?;
    let lly = object_to_f64(&arr[1])?;
    let urx = object_to_f64(&arr[2])?;
    let ury = object_to_f64(&arr[3])?;
    let width = urx - llx;
    let height = ury - lly;
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    Some(PageSize::new(width, height))
}

/// Follow a reference to its target object; non-references pass through.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

pub(crate) fn object_to_f64(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some((*f).into()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::single_page_pdf;

    #[test]
    fn test_is_pdf_candidate_accepts_pdf_header() {
        assert!(is_pdf_candidate(b"%PDF-1.7 rest of file"));
    }

    #[test]
    fn test_is_pdf_candidate_rejects_other_bytes() {
        assert!(!is_pdf_candidate(b"PNG..."));
        assert!(!is_pdf_candidate(b""));
        assert!(!is_pdf_candidate(b"%PD"));
    }

    #[test]
    fn test_parse_failure_is_parse_error() {
        let err = SignDocument::from_bytes(b"%PDF-not really").unwrap_err();
        assert!(matches!(err, PlacementError::ParseError(_)));
    }

    #[test]
    fn test_page_count_and_size() {
        let bytes = single_page_pdf(612.0, 792.0, None);
        let doc = SignDocument::from_bytes(&bytes).unwrap();
        assert_eq!(doc.page_count(), 1);
        let size = doc.page_size(1).unwrap();
        assert_eq!(size.width, 612.0);
        assert_eq!(size.height, 792.0);
    }

    #[test]
    fn test_missing_page_has_no_size() {
        let bytes = single_page_pdf(612.0, 792.0, None);
        let doc = SignDocument::from_bytes(&bytes).unwrap();
        assert!(doc.page_size(2).is_none());
    }
}
