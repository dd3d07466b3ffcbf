// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fixtures shared by the unit tests: small PDFs built with lopdf and encoded
// images built with the `image` crate.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use lopdf::{Dictionary, Object, ObjectId, Stream, dictionary};

/// Side length of the shared fixture image.
const IMAGE_SIDE: u32 = 16;

/// A `pages`-page A4 document. Every page shows "(Page N)" in font F1 and
/// paints the same 16x16 RGB image `/Im0`; MediaBox and Resources are
/// inherited from the Pages node.
pub(crate) fn sample_pdf(pages: usize) -> Vec<u8> {
    build(pages, None, &[])
}

/// As [`sample_pdf`], with `/Rotate degrees` on every page.
pub(crate) fn sample_pdf_with_rotation(pages: usize, degrees: i64) -> Vec<u8> {
    build(pages, Some(degrees), &[])
}

/// One page that declares `/Im0` and `/Im1` but only paints `/Im0`.
pub(crate) fn pdf_with_unpainted_image() -> Vec<u8> {
    build(1, None, &[b"Im1"])
}

fn build(pages: usize, rotate: Option<i64>, extra_images: &[&[u8]]) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let mut xobjects = Dictionary::new();
    xobjects.set("Im0", add_rgb_image(&mut doc));
    for name in extra_images {
        xobjects.set(name.to_vec(), add_rgb_image(&mut doc));
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
        "XObject" => xobjects,
    });

    let mut kids = Vec::with_capacity(pages);
    for number in 1..=pages {
        let content = format!(
            "BT /F1 12 Tf 72 720 Td (Page {}) Tj ET q {} 0 0 {} 0 0 cm /Im0 Do Q",
            number, IMAGE_SIDE, IMAGE_SIDE
        );
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        };
        if let Some(degrees) = rotate {
            page.set("Rotate", Object::Integer(degrees));
        }
        kids.push(Object::Reference(doc.add_object(page)));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(pages as i64),
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("fixture PDF serialises");
    bytes
}

/// One page with a URI `/Link` annotation that points back at the page
/// through `/P` and a `/Dest`, plus `/Tabs /S`.
pub(crate) fn pdf_with_link_annotation() -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.new_object_id();

    let link_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => integers(&[72, 700, 200, 720]),
        "P" => page_id,
        "Dest" => vec![Object::Reference(page_id), "Fit".into()],
        "A" => dictionary! {
            "S" => "URI",
            "URI" => Object::string_literal("https://example.org/"),
        },
    });
    let content_id = doc.add_object(Stream::new(
        Dictionary::new(),
        b"BT /F1 12 Tf 72 705 Td (Visit) Tj ET".to_vec(),
    ));
    doc.objects.insert(
        page_id,
        Object::Dictionary(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => integers(&[0, 0, 595, 842]),
            "Contents" => content_id,
            "Annots" => vec![Object::Reference(link_id)],
            "Tabs" => "S",
        }),
    );
    finish(doc, pages_id, vec![page_id])
}

/// One page that paints form `/Fm0`, which in turn paints the 16x16 RGB image
/// `/Im0` from its own resources.
pub(crate) fn pdf_with_form_image() -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = add_rgb_image(&mut doc);
    let side = i64::from(IMAGE_SIDE);
    let form_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => integers(&[0, 0, side, side]),
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
        },
        format!("q {} 0 0 {} 0 0 cm /Im0 Do Q", side, side).into_bytes(),
    ));
    let content_id = doc.add_object(Stream::new(
        Dictionary::new(),
        b"q 1 0 0 1 100 100 cm /Fm0 Do Q".to_vec(),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => integers(&[0, 0, 595, 842]),
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Fm0" => form_id },
        },
        "Contents" => content_id,
    });
    finish(doc, pages_id, vec![page_id])
}

/// One page painting a 16x16 DeviceGray image with a colour-key `/Mask [0 10]`.
pub(crate) fn pdf_with_color_key_mask() -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let side = i64::from(IMAGE_SIDE);
    let pixels: Vec<u8> = (0..IMAGE_SIDE * IMAGE_SIDE).map(|i| (i % 256) as u8).collect();
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => Object::Integer(side),
            "Height" => Object::Integer(side),
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => Object::Integer(8),
            "Mask" => integers(&[0, 10]),
        },
        pixels,
    ));
    let content_id = doc.add_object(Stream::new(
        Dictionary::new(),
        format!("q {} 0 0 {} 0 0 cm /Im0 Do Q", side, side).into_bytes(),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => integers(&[0, 0, 595, 842]),
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
        "Contents" => content_id,
    });
    finish(doc, pages_id, vec![page_id])
}

fn integers(values: &[i64]) -> Object {
    Object::Array(values.iter().copied().map(Object::Integer).collect())
}

/// Add the Pages node and catalog, then serialise.
fn finish(mut doc: lopdf::Document, pages_id: ObjectId, kids: Vec<ObjectId>) -> Vec<u8> {
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => Object::Integer(kids.len() as i64),
            "Kids" => kids.into_iter().map(Object::Reference).collect::<Vec<_>>(),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("fixture PDF serialises");
    bytes
}

/// Uncompressed 16x16 DeviceRGB gradient.
fn add_rgb_image(doc: &mut lopdf::Document) -> ObjectId {
    let side = i64::from(IMAGE_SIDE);
    doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => Object::Integer(side),
            "Height" => Object::Integer(side),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => Object::Integer(8),
        },
        gradient(IMAGE_SIDE, IMAGE_SIDE).into_raw(),
    ))
}

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    })
}

/// A `width` x `height` JPEG.
pub(crate) fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, 90);
    gradient(width, height)
        .write_with_encoder(encoder)
        .expect("fixture JPEG encodes");
    buffer
}

/// A fully transparent `width` x `height` PNG.
pub(crate) fn png_rgba_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    let mut buffer = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("fixture PNG encodes");
    buffer
}
