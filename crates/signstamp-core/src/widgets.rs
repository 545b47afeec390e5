//! Signature form-widget enumeration
//!
//! Scans a page's annotation array for AcroForm widgets whose field type
//! is `/Sig`, resolving the field type through the `Parent` chain when the
//! widget and its field are split. Malformed entries are skipped; tier
//! fallthrough handles the rest.

use lopdf::{Dictionary, Document, Object};

use crate::document::{object_to_f64, resolve, SignDocument};
use crate::geometry::{PageRect, PageSize};

/// Parent-chain lookups are bounded to guard against reference cycles.
const MAX_PARENT_DEPTH: usize = 8;

/// Rectangles of all signature widgets on a page, converted to top-origin
/// points. Missing or malformed annotation data yields an empty result.
pub(crate) fn signature_widget_rects(doc: &SignDocument, page: u32, size: PageSize) -> Vec<PageRect> {
    let Some(page_id) = doc.page_object_id(page) else {
        return Vec::new();
    };
    let raw = doc.doc();
    let Ok(page_dict) = raw.get_object(page_id).and_then(|o| o.as_dict()) else {
        return Vec::new();
    };
    let Ok(annots_obj) = page_dict.get(b"Annots") else {
        return Vec::new();
    };
    let Ok(annots) = resolve(raw, annots_obj).as_array() else {
        return Vec::new();
    };

    let mut rects = Vec::new();
    for entry in annots {
        let Ok(annot) = resolve(raw, entry).as_dict() else {
            continue;
        };
        if !is_signature_field(raw, annot) {
            continue;
        }
        if let Some(rect) = widget_rect(raw, annot, size) {
            rects.push(rect);
        }
    }
    rects
}

/// A widget targets a signature iff `/FT /Sig` appears on the annotation
/// or on one of its ancestor field dictionaries.
fn is_signature_field(doc: &Document, annot: &Dictionary) -> bool {
    let mut dict = annot;
    for _ in 0..MAX_PARENT_DEPTH {
        if let Ok(Object::Name(ft)) = dict.get(b"FT").map(|o| resolve(doc, o)) {
            return ft == b"Sig";
        }
        match dict.get(b"Parent").map(|o| resolve(doc, o)) {
            Ok(Object::Dictionary(parent)) => dict = parent,
            _ => return false,
        }
    }
    false
}

fn widget_rect(doc: &Document, annot: &Dictionary, size: PageSize) -> Option<PageRect> {
    let rect = resolve(doc, annot.get(b"Rect").ok()?).as_array().ok()?;
    if rect.len() < 4 {
        return None;
    }
    let llx = object_to_f64(resolve(doc, &rect[0]))?;
    let lly = object_to_f64(resolve(doc, &rect[1]))?;
    let urx = object_to_f64(resolve(doc, &rect[2]))?;
    let ury = object_to_f64(resolve(doc, &rect[3]))?;
    // Annotation rects are bottom-origin; flip to top-origin.
    Some(PageRect {
        x0: llx,
        y0: size.height - ury,
        x1: urx,
        y1: size.height - lly,
    })
}
