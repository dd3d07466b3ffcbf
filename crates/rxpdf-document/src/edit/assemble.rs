// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Build a document from raster images, one image per page.

use lopdf::Object;
use lopdf::content::{Content, Operation};
use rxpdf_core::error::{FormatLocation, Result, RxPdfError};
use tracing::{debug, info, instrument};

use crate::codec::ImageProcessor;
use crate::model::{Document, ImageResource, ObjectKey, Page, PixelFormat};

/// Resource name of the single image on an assembled page.
const IMAGE_NAME: &str = "Im0";

/// Turn each encoded image into a page sized to its pixel dimensions (one
/// pixel per point), preserving input order.
///
/// Images are flattened to RGB over white and embedded as JPEG at `quality`.
/// An undecodable image aborts with a `Format` error naming its position.
#[instrument(skip(images), fields(inputs = images.len()))]
pub fn assemble<B: AsRef<[u8]>>(images: &[B], quality: u8) -> Result<Document> {
    if images.is_empty() {
        return Err(RxPdfError::NoValidInputs);
    }

    let mut pages = Vec::with_capacity(images.len());
    for (index, bytes) in images.iter().enumerate() {
        let processor =
            ImageProcessor::from_bytes(bytes.as_ref(), FormatLocation::Input(index))?.flatten();
        let (width, height) = (processor.width(), processor.height());
        let jpeg = processor.to_jpeg_bytes(quality)?;
        debug!(input = index, width, height, jpeg_bytes = jpeg.len(), "Image embedded");

        let key = u32::try_from(index + 1)
            .map(ObjectKey)
            .map_err(|_| RxPdfError::Encode("too many images to assemble".to_string()))?;
        let image = ImageResource::new(
            IMAGE_NAME,
            key,
            jpeg,
            width,
            height,
            PixelFormat::rgb8(),
            vec![b"DCTDecode".to_vec()],
        );
        pages.push(
            Page::new(width, height)
                .with_content(paint_full_page(width, height)?)
                .with_image(image),
        );
    }

    let document = Document::from_pages(pages);
    info!(pages = document.page_count(), "Images assembled into document");
    Ok(document)
}

/// `q w 0 0 h 0 0 cm /Im0 Do Q`: stretch the image over the whole page.
fn paint_full_page(width: u32, height: u32) -> Result<Vec<u8>> {
    let (w, h) = (i64::from(width), i64::from(height));
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Integer(w),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(h),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    content
        .encode()
        .map_err(|err| RxPdfError::Encode(format!("failed to encode page content: {}", err)))
}
