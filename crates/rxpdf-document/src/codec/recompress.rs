// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image recompression — downsample and JPEG re-encode every embedded image.

use std::collections::HashMap;

use lopdf::{Dictionary, Object, Stream};
use rxpdf_core::CompressOptions;
use rxpdf_core::error::{FormatLocation, Result};
use tracing::{debug, info, instrument};

use super::decode::decode_image;
use super::processor::ImageProcessor;
use crate::model::image::is_raster_image;
use crate::model::{Document, ImageResource, ObjectKey};
use crate::pdf::objects::{MAX_DEPTH, stream_digest};

/// Replacement for one image object.
#[derive(Clone)]
struct Reencoded {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

/// Per-call state: what has been re-encoded so far and the byte totals.
struct Session<'a> {
    options: &'a CompressOptions,
    scale: f64,
    /// Page-level images by key; `None` marks one kept under `only_if_smaller`.
    done: HashMap<ObjectKey, Option<Reencoded>>,
    /// Images nested in forms, by digest of the original stream.
    nested: HashMap<[u8; 32], Option<Stream>>,
    bytes_before: usize,
    bytes_after: usize,
}

/// Recompress every image in `document`, including images painted from
/// inside form XObjects.
///
/// Images shared between pages are processed once. Any image that cannot be
/// decoded aborts the whole operation; nothing is skipped silently.
#[instrument(skip_all, fields(pages = document.page_count(), dpi = options.dpi, quality = options.quality))]
pub fn recompress(mut document: Document, options: &CompressOptions) -> Result<Document> {
    let mut session = Session {
        options,
        scale: options.scale(),
        done: HashMap::new(),
        nested: HashMap::new(),
        bytes_before: 0,
        bytes_after: 0,
    };

    for (index, page) in document.pages_mut().iter_mut().enumerate() {
        let location = FormatLocation::Page(index);
        for image in page.images_mut() {
            session.page_image(image, location)?;
        }
        session.form_images(page.resources_mut(), location, 0)?;
    }

    info!(
        images = session.done.len(),
        nested_images = session.nested.len(),
        bytes_before = session.bytes_before,
        bytes_after = session.bytes_after,
        "Images recompressed"
    );
    Ok(document)
}

impl Session<'_> {
    fn page_image(&mut self, image: &mut ImageResource, location: FormatLocation) -> Result<()> {
        let key = image.key();
        let outcome = match self.done.get(&key) {
            Some(outcome) => outcome.clone(),
            None => {
                let outcome = self.reencode(image, location)?;
                self.done.insert(key, outcome.clone());
                outcome
            }
        };
        if let Some(Reencoded {
            data,
            width,
            height,
        }) = outcome
        {
            image.replace_with_jpeg(data, width, height);
        }
        Ok(())
    }

    /// Re-encode images held inline in `resources`' XObject table, descending
    /// into the resources of every form found there.
    fn form_images(
        &mut self,
        resources: &mut Dictionary,
        location: FormatLocation,
        depth: usize,
    ) -> Result<()> {
        if depth > MAX_DEPTH {
            return Ok(());
        }
        let Ok(Object::Dictionary(xobjects)) = resources.get_mut(b"XObject") else {
            return Ok(());
        };
        for (name, entry) in xobjects.iter_mut() {
            let Object::Stream(stream) = entry else {
                continue;
            };
            if is_raster_image(&stream.dict) {
                if let Some(replacement) = self.nested_image(name, stream, location)? {
                    *stream = replacement;
                }
            } else if let Ok(Object::Dictionary(inner)) = stream.dict.get_mut(b"Resources") {
                self.form_images(inner, location, depth + 1)?;
            }
        }
        Ok(())
    }

    fn nested_image(
        &mut self,
        name: &[u8],
        stream: &Stream,
        location: FormatLocation,
    ) -> Result<Option<Stream>> {
        let digest = stream_digest(stream);
        if let Some(outcome) = self.nested.get(&digest) {
            return Ok(outcome.clone());
        }
        // Nested images never reach the serializer's image table, so the key
        // only labels log lines.
        let mut image = ImageResource::from_dictionary(
            name,
            ObjectKey(0),
            &stream.dict,
            stream.content.clone(),
            location,
        )?;
        let outcome = self.reencode(&image, location)?.map(|reencoded| {
            image.replace_with_jpeg(reencoded.data, reencoded.width, reencoded.height);
            image.to_stream()
        });
        self.nested.insert(digest, outcome.clone());
        Ok(outcome)
    }

    fn reencode(
        &mut self,
        image: &ImageResource,
        location: FormatLocation,
    ) -> Result<Option<Reencoded>> {
        let outcome = reencode(image, self.scale, self.options, location)?;
        self.bytes_before += image.data().len();
        self.bytes_after += outcome
            .as_ref()
            .map_or(image.data().len(), |reencoded| reencoded.data.len());
        Ok(outcome)
    }
}

fn reencode(
    image: &ImageResource,
    scale: f64,
    options: &CompressOptions,
    location: FormatLocation,
) -> Result<Option<Reencoded>> {
    let pixels = decode_image(image, location)?;
    let processor = ImageProcessor::from_dynamic(pixels)
        .flatten()
        .rescale(scale)?;
    let data = processor.to_jpeg_bytes(options.quality)?;

    debug!(
        key = %image.key(),
        from = ?(image.width(), image.height()),
        to = ?(processor.width(), processor.height()),
        before = image.data().len(),
        after = data.len(),
        "Image re-encoded"
    );

    if options.only_if_smaller && data.len() >= image.data().len() {
        debug!(key = %image.key(), "Re-encoding did not shrink the image, keeping original");
        return Ok(None);
    }
    Ok(Some(Reencoded {
        width: processor.width(),
        height: processor.height(),
        data,
    }))
}
