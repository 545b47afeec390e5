//! Raster signature compositing
//!
//! Burns a decoded signature image into the requested page regions and
//! serializes the mutated document. The image is embedded once as an RGB
//! XObject with its alpha plane as an SMask, then drawn per placement via
//! a `q cm Do Q` content fragment, aspect-preserved and centered in the
//! target rectangle.

use std::collections::BTreeMap;

use lopdf::{dictionary, Dictionary, Object, ObjectId, Stream};
use tracing::debug;

use crate::document::{SignDocument, DEFAULT_PAGE_SIZE};
use crate::error::PlacementError;
use crate::geometry::{aspect_fit, NormalizedRect};

/// Resource name under which the signature XObject is registered on each
/// stamped page.
const XOBJECT_NAME: &str = "ImSig";

/// A decoded raster signature, normalized to RGBA and split into the RGB
/// and alpha planes a PDF image XObject needs. Lives for one compositing
/// call.
#[derive(Debug)]
pub struct SignatureImage {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
    alpha: Vec<u8>,
}

impl SignatureImage {
    /// Decode any raster format the image crate understands; transparency
    /// is retained through the separated alpha plane.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PlacementError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| PlacementError::DecodeError(e.to_string()))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        let mut alpha = Vec::with_capacity((width * height) as usize);
        for pixel in img.pixels() {
            rgb.push(pixel[0]);
            rgb.push(pixel[1]);
            rgb.push(pixel[2]);
            alpha.push(pixel[3]);
        }
        Ok(Self {
            width,
            height,
            rgb,
            alpha,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Apply `placements` to `doc` and serialize the result.
///
/// Placements are grouped per page; a group whose page lies outside
/// `1..=page_count` is discarded without error (stale client state).
/// Within a page, placements draw in caller order, later ones on top.
/// An empty placement list still re-serializes the document.
pub fn composite(
    mut doc: SignDocument,
    signature: &SignatureImage,
    placements: &[NormalizedRect],
) -> Result<Vec<u8>, PlacementError> {
    let page_count = doc.page_count();

    let mut by_page: BTreeMap<u32, Vec<&NormalizedRect>> = BTreeMap::new();
    for placement in placements {
        if placement.page < 1 || placement.page > page_count {
            debug!(page = placement.page, "dropping out-of-range placement");
            continue;
        }
        by_page.entry(placement.page).or_default().push(placement);
    }

    if !by_page.is_empty() {
        let image_id = embed_signature_xobject(&mut doc, signature);

        for (&page, group) in &by_page {
            let Some(page_id) = doc.page_object_id(page) else {
                continue;
            };
            let size = doc.page_size(page).unwrap_or(DEFAULT_PAGE_SIZE);

            register_xobject(&mut doc, page_id, image_id)?;

            let mut ops = String::new();
            for placement in group {
                let target = placement.to_page_rect(size);
                let draw = aspect_fit(
                    signature.width() as f64,
                    signature.height() as f64,
                    target,
                );
                // Top-origin rect to PDF coordinates: the lower-left corner
                // of the drawn image sits at height - draw.y1.
                let pdf_y = size.height - draw.y1;
                ops.push_str(&format!(
                    "q {:.2} 0 0 {:.2} {:.2} {:.2} cm /{} Do Q\n",
                    draw.width(),
                    draw.height(),
                    draw.x0,
                    pdf_y,
                    XOBJECT_NAME,
                ));
            }

            doc.doc_mut()
                .add_page_contents(page_id, ops.into_bytes())
                .map_err(|e| PlacementError::CompositingError(e.to_string()))?;
        }
    }

    doc.save_to_bytes()
}

/// Add the signature image and its SMask to the document once; placements
/// reference them by object id.
fn embed_signature_xobject(doc: &mut SignDocument, signature: &SignatureImage) -> ObjectId {
    let raw = doc.doc_mut();
    let smask_id = raw.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => signature.width as i64,
            "Height" => signature.height as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        signature.alpha.clone(),
    ));
    raw.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => signature.width as i64,
            "Height" => signature.height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "SMask" => smask_id,
        },
        signature.rgb.clone(),
    ))
}

/// Make the image XObject addressable from a page's resource dictionary.
fn register_xobject(
    doc: &mut SignDocument,
    page_id: ObjectId,
    image_id: ObjectId,
) -> Result<(), PlacementError> {
    let raw = doc.doc_mut();
    let mut resources_obj = {
        let page_dict = raw
            .get_object_mut(page_id)
            .and_then(|o| o.as_dict_mut())
            .map_err(|e| PlacementError::CompositingError(e.to_string()))?;
        page_dict
            .remove(b"Resources")
            .unwrap_or_else(|| Object::Dictionary(dictionary! {}))
    };

    match &mut resources_obj {
        Object::Reference(id) => {
            let res_dict = raw
                .get_object_mut(*id)
                .and_then(|o| o.as_dict_mut())
                .map_err(|e| PlacementError::CompositingError(e.to_string()))?;
            ensure_xobject_dict(res_dict)?.set(XOBJECT_NAME, image_id);
        }
        Object::Dictionary(ref mut dict) => {
            ensure_xobject_dict(dict)?.set(XOBJECT_NAME, image_id);
        }
        _ => {
            return Err(PlacementError::CompositingError(
                "page resources are not a dictionary".to_string(),
            ));
        }
    }

    let page_dict = raw
        .get_object_mut(page_id)
        .and_then(|o| o.as_dict_mut())
        .map_err(|e| PlacementError::CompositingError(e.to_string()))?;
    page_dict.set("Resources", resources_obj);
    Ok(())
}

fn ensure_xobject_dict(res_dict: &mut Dictionary) -> Result<&mut Dictionary, PlacementError> {
    let xobj_owned = res_dict
        .remove(b"XObject")
        .unwrap_or_else(|| Object::Dictionary(dictionary! {}));

    let sanitized = match xobj_owned {
        Object::Dictionary(dict) => Object::Dictionary(dict),
        Object::Reference(_) => Object::Dictionary(dictionary! {}),
        _ => {
            return Err(PlacementError::CompositingError(
                "page XObject entry is not a dictionary".to_string(),
            ));
        }
    };

    res_dict.set("XObject", sanitized);
    match res_dict.get_mut(b"XObject") {
        Ok(Object::Dictionary(ref mut dict)) => Ok(dict),
        _ => Err(PlacementError::CompositingError(
            "page XObject entry is not a dictionary".to_string(),
        )),
    }
}
