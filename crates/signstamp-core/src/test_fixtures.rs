//! lopdf-built fixture documents shared by the unit tests.

use lopdf::{dictionary, Document, Object, Stream};

/// One page of a fixture document.
pub struct PageSpec {
    pub width: f64,
    pub height: f64,
    pub content: Option<String>,
    /// Signature widget rects in PDF coordinates `[llx, lly, urx, ury]`.
    pub sig_widgets: Vec<[f64; 4]>,
}

impl PageSpec {
    pub fn blank(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            content: None,
            sig_widgets: Vec::new(),
        }
    }

    /// A page showing `text` at baseline `(x, y)` in PDF coordinates.
    pub fn with_text(width: f64, height: f64, text: &str, x: f64, y: f64, font_size: f64) -> Self {
        Self {
            width,
            height,
            content: Some(format!(
                "BT /F1 {} Tf {} {} Td ({}) Tj ET",
                font_size, x, y, text
            )),
            sig_widgets: Vec::new(),
        }
    }

    pub fn with_sig_widgets(width: f64, height: f64, rects: &[[f64; 4]]) -> Self {
        Self {
            width,
            height,
            content: None,
            sig_widgets: rects.to_vec(),
        }
    }
}

/// Build a serialized PDF from page specs.
pub fn build_pdf(specs: &[PageSpec]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut page_ids = Vec::new();
    for spec in specs {
        let mut page_dict = dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(spec.width as f32),
                Object::Real(spec.height as f32),
            ],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
        };

        if let Some(content) = &spec.content {
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.as_bytes().to_vec(),
            ));
            page_dict.set("Contents", Object::Reference(content_id));
        }

        if !spec.sig_widgets.is_empty() {
            let mut annot_refs = Vec::new();
            for rect in &spec.sig_widgets {
                let annot_id = doc.add_object(dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Widget",
                    "FT" => "Sig",
                    "Rect" => vec![
                        Object::Real(rect[0] as f32),
                        Object::Real(rect[1] as f32),
                        Object::Real(rect[2] as f32),
                        Object::Real(rect[3] as f32),
                    ],
                });
                annot_refs.push(Object::Reference(annot_id));
            }
            page_dict.set("Annots", annot_refs);
        }

        page_ids.push(doc.add_object(page_dict));
    }

    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids
            .iter()
            .map(|id| Object::Reference(*id))
            .collect::<Vec<_>>(),
        "Count" => specs.len() as i64,
    });
    for id in &page_ids {
        if let Ok(page) = doc.get_object_mut(*id) {
            if let Ok(dict) = page.as_dict_mut() {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

pub fn single_page_pdf(width: f64, height: f64, content: Option<&str>) -> Vec<u8> {
    build_pdf(&[PageSpec {
        width,
        height,
        content: content.map(|c| c.to_string()),
        sig_widgets: Vec::new(),
    }])
}

/// A 4x4 opaque red PNG, decodable by the image crate.
pub fn tiny_png() -> Vec<u8> {
    use std::io::Cursor;

    let mut img = image::RgbaImage::new(4, 4);
    for pixel in img.pixels_mut() {
        *pixel = image::Rgba([200, 30, 30, 255]);
    }
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

/// A wide (8x2) PNG with a transparent right half.
pub fn wide_png_with_alpha() -> Vec<u8> {
    use std::io::Cursor;

    let mut img = image::RgbaImage::new(8, 2);
    for (x, _, pixel) in img.enumerate_pixels_mut() {
        let alpha = if x < 4 { 255 } else { 0 };
        *pixel = image::Rgba([0, 0, 120, alpha]);
    }
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}
