//! Best-effort positioned text search over page content streams
//!
//! Walks the decoded content stream tracking the text cursor through
//! `BT/ET`, `Tf`, `Td/TD/TL/T*/Tm` and collects the strings shown by
//! `Tj/TJ/'/"`. Glyph advances are estimated from the active font size,
//! so match rectangles are approximate. Scaling and rotation components
//! of `Tm` are ignored.

use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};

use crate::document::{object_to_f64, SignDocument};
use crate::geometry::{PageRect, PageSize};

/// Approximate average glyph advance for Latin text, as a fraction of the
/// font size.
const AVG_GLYPH_ADVANCE: f64 = 0.5;

/// A run of shown text anchored at its baseline in PDF coordinates
/// (bottom-left origin).
#[derive(Debug, Clone)]
struct TextSpan {
    text: String,
    x: f64,
    y: f64,
    font_size: f64,
}

/// Case-insensitive search for `needle` on a page. Returns approximate
/// match rectangles in top-origin points, in content-stream order.
pub(crate) fn find_text(
    doc: &SignDocument,
    page: u32,
    needle: &str,
    size: PageSize,
) -> Vec<PageRect> {
    let Some(page_id) = doc.page_object_id(page) else {
        return Vec::new();
    };
    let needle_lower = needle.to_lowercase();
    if needle_lower.is_empty() {
        return Vec::new();
    }
    let needle_chars = needle_lower.chars().count() as f64;

    let mut matches = Vec::new();
    for span in page_text_spans(doc.doc(), page_id) {
        let haystack = span.text.to_lowercase();
        let char_w = span.font_size * AVG_GLYPH_ADVANCE;
        for (byte_idx, _) in haystack.match_indices(&needle_lower) {
            let char_idx = haystack[..byte_idx].chars().count() as f64;
            let x0 = span.x + char_idx * char_w;
            let x1 = x0 + needle_chars * char_w;
            // Text box from baseline to baseline + font size, flipped to
            // top-origin.
            matches.push(PageRect {
                x0,
                y0: size.height - (span.y + span.font_size),
                x1,
                y1: size.height - span.y,
            });
        }
    }
    matches
}

fn page_text_spans(doc: &Document, page_id: ObjectId) -> Vec<TextSpan> {
    let Ok(content) = doc.get_page_content(page_id) else {
        return Vec::new();
    };
    let Ok(operations) = Content::decode(&content) else {
        return Vec::new();
    };

    let mut spans = Vec::new();
    let mut font_size = 0.0f64;
    let mut leading = 0.0f64;
    let mut line_x = 0.0f64;
    let mut line_y = 0.0f64;
    let mut cur_x = 0.0f64;
    let mut cur_y = 0.0f64;

    for op in &operations.operations {
        match op.operator.as_str() {
            "BT" => {
                line_x = 0.0;
                line_y = 0.0;
                cur_x = 0.0;
                cur_y = 0.0;
            }
            "Tf" => {
                if let Some(size) = op.operands.get(1).and_then(object_to_f64) {
                    font_size = size;
                }
            }
            "TL" => {
                if let Some(l) = op.operands.first().and_then(object_to_f64) {
                    leading = l;
                }
            }
            "Td" | "TD" => {
                let tx = op.operands.first().and_then(object_to_f64).unwrap_or(0.0);
                let ty = op.operands.get(1).and_then(object_to_f64).unwrap_or(0.0);
                if op.operator == "TD" {
                    leading = -ty;
                }
                line_x += tx;
                line_y += ty;
                cur_x = line_x;
                cur_y = line_y;
            }
            "Tm" => {
                // Only the translation components matter here.
                let e = op.operands.get(4).and_then(object_to_f64).unwrap_or(0.0);
                let f = op.operands.get(5).and_then(object_to_f64).unwrap_or(0.0);
                line_x = e;
                line_y = f;
                cur_x = line_x;
                cur_y = line_y;
            }
            "T*" => {
                line_y -= leading;
                cur_x = line_x;
                cur_y = line_y;
            }
            "Tj" => {
                for operand in &op.operands {
                    show_text(operand, font_size, &mut cur_x, cur_y, &mut spans);
                }
            }
            "'" | "\"" => {
                line_y -= leading;
                cur_x = line_x;
                cur_y = line_y;
                if let Some(operand @ Object::String(..)) = op.operands.last() {
                    show_text(operand, font_size, &mut cur_x, cur_y, &mut spans);
                }
            }
            "TJ" => {
                for operand in &op.operands {
                    if let Object::Array(items) = operand {
                        for item in items {
                            match item {
                                Object::String(..) => {
                                    show_text(item, font_size, &mut cur_x, cur_y, &mut spans);
                                }
                                Object::Integer(n) => {
                                    cur_x -= *n as f64 / 1000.0 * font_size;
                                }
                                Object::Real(n) => {
                                    cur_x -= *n as f64 / 1000.0 * font_size;
                                }
                                _ => {}
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }
    spans
}

fn show_text(operand: &Object, font_size: f64, cur_x: &mut f64, cur_y: f64, spans: &mut Vec<TextSpan>) {
    let Object::String(bytes, _) = operand else {
        return;
    };
    let text = decode_pdf_string(bytes);
    if text.is_empty() {
        return;
    }
    let advance = text.chars().count() as f64 * font_size * AVG_GLYPH_ADVANCE;
    spans.push(TextSpan {
        text,
        x: *cur_x,
        y: cur_y,
        font_size,
    });
    *cur_x += advance;
}

/// Decode a PDF string: UTF-8 first, UTF-16BE with BOM, then Latin-1.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let chars: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|chunk| {
                if chunk.len() == 2 {
                    Some(u16::from_be_bytes([chunk[0], chunk[1]]))
                } else {
                    None
                }
            })
            .collect();
        if let Ok(s) = String::from_utf16(&chars) {
            return s;
        }
    }
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{build_pdf, PageSpec};

    fn letter() -> PageSize {
        PageSize::new(612.0, 792.0)
    }

    #[test]
    fn test_find_text_locates_label() {
        let bytes = build_pdf(&[PageSpec::with_text(
            612.0, 792.0, "Signature:", 72.0, 120.0, 12.0,
        )]);
        let doc = SignDocument::from_bytes(&bytes).unwrap();
        let matches = find_text(&doc, 1, "Signature", letter());
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert!((m.x0 - 72.0).abs() < 1e-6);
        // Baseline at 120pt from the bottom, 12pt box, top-origin.
        assert!((m.y1 - (792.0 - 120.0)).abs() < 1e-6);
        assert!((m.y0 - (792.0 - 132.0)).abs() < 1e-6);
        // 9 chars at 6pt estimated advance.
        assert!((m.x1 - m.x0 - 9.0 * 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_find_text_is_case_insensitive() {
        let bytes = build_pdf(&[PageSpec::with_text(
            612.0, 792.0, "UNTERSCHRIFT", 100.0, 300.0, 10.0,
        )]);
        let doc = SignDocument::from_bytes(&bytes).unwrap();
        assert_eq!(find_text(&doc, 1, "Unterschrift", letter()).len(), 1);
    }

    #[test]
    fn test_find_text_offsets_into_span() {
        let bytes = build_pdf(&[PageSpec::with_text(
            612.0, 792.0, "Ort, Datum", 50.0, 200.0, 10.0,
        )]);
        let doc = SignDocument::from_bytes(&bytes).unwrap();
        let matches = find_text(&doc, 1, "Datum", letter());
        assert_eq!(matches.len(), 1);
        // "Datum" starts at char 5 of the span: 50 + 5 * 5pt.
        assert!((matches[0].x0 - 75.0).abs() < 1e-6);
    }

    #[test]
    fn test_find_text_no_match_on_blank_page() {
        let bytes = build_pdf(&[PageSpec::blank(612.0, 792.0)]);
        let doc = SignDocument::from_bytes(&bytes).unwrap();
        assert!(find_text(&doc, 1, "Signature", letter()).is_empty());
    }

    #[test]
    fn test_find_text_missing_page_is_empty() {
        let bytes = build_pdf(&[PageSpec::blank(612.0, 792.0)]);
        let doc = SignDocument::from_bytes(&bytes).unwrap();
        assert!(find_text(&doc, 9, "Signature", letter()).is_empty());
    }

    #[test]
    fn test_decode_pdf_string_utf16be() {
        // "Ab" as UTF-16BE with BOM.
        let bytes = [0xFE, 0xFF, 0x00, 0x41, 0x00, 0x62];
        assert_eq!(decode_pdf_string(&bytes), "Ab");
    }

    #[test]
    fn test_decode_pdf_string_latin1_fallback() {
        // 0xDC is not valid UTF-8 on its own; Latin-1 maps it to 'Ü'.
        let bytes = [0xDC, 0x62, 0x65, 0x72];
        assert_eq!(decode_pdf_string(&bytes), "Über");
    }
}
