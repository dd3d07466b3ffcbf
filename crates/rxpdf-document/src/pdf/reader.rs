// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — parse container bytes with `lopdf` and lift the page tree into
// the owned document model.

use std::collections::BTreeSet;

use lopdf::{Dictionary, Object, ObjectId};
use rxpdf_core::Rotation;
use rxpdf_core::error::{FormatLocation, Result, RxPdfError};
use tracing::{debug, info, instrument, warn};

use super::objects::{self, MAX_DEPTH};
use crate::model::image::is_raster_image;
use crate::model::page::{BOX_KEYS, DEFAULT_MEDIA_BOX, MODELLED_PAGE_KEYS};
use crate::model::{Document, ImageResource, ObjectKey, Page};

/// How far from either end of the input the header and trailer markers may sit.
const MARKER_WINDOW: usize = 1024;

/// Keys a page inherits from its ancestors in the page tree.
const INHERITED_BOX_KEYS: &[&[u8]] = &[b"MediaBox", b"CropBox"];

/// Parse PDF bytes into a [`Document`].
pub fn load(data: &[u8]) -> Result<Document> {
    PdfReader::from_bytes(data)?.read_document()
}

/// Reads an existing PDF container.
///
/// Wraps `lopdf::Document` and converts its page tree into the owned model.
pub struct PdfReader {
    /// The underlying lopdf document.
    document: lopdf::Document,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        check_markers(data)?;

        let document = lopdf::Document::load_mem(data).map_err(|err| {
            RxPdfError::format(
                FormatLocation::Document,
                format!("failed to parse PDF: {}", err),
            )
        })?;

        if document.trailer.get(b"Encrypt").is_ok() {
            return Err(RxPdfError::format(
                FormatLocation::Document,
                "encrypted documents are not supported",
            ));
        }
        document.catalog().map_err(|err| {
            RxPdfError::format(FormatLocation::Document, format!("no catalog: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF parsed");

        Ok(Self { document })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the page tree.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    // -- Conversion -----------------------------------------------------------

    /// Lift every page, in page-tree order, into an owned [`Document`].
    #[instrument(skip(self))]
    pub fn read_document(&self) -> Result<Document> {
        let pages = self.document.get_pages();
        let page_ids: BTreeSet<ObjectId> = pages.values().copied().collect();
        let mut model_pages = Vec::with_capacity(pages.len());

        // get_pages is keyed by 1-based page number, so iteration is in order.
        for (index, page_id) in pages.values().enumerate() {
            model_pages.push(self.read_page(index, *page_id, &page_ids)?);
        }

        let document = Document::from_pages(model_pages);
        info!(
            pages = document.page_count(),
            images = document.pages().iter().map(|p| p.images().len()).sum::<usize>(),
            "Document loaded"
        );
        Ok(document)
    }

    fn read_page(
        &self,
        index: usize,
        page_id: ObjectId,
        page_ids: &BTreeSet<ObjectId>,
    ) -> Result<Page> {
        let source = &self.document;
        let at_page = FormatLocation::Object(page_id.0, page_id.1);
        let page_dict = source.get_dictionary(page_id).map_err(|err| {
            RxPdfError::format(at_page, format!("page object is not a dictionary: {}", err))
        })?;

        let rotation = self.read_rotation(index, page_dict);

        let mut boxes = Dictionary::new();
        for key in BOX_KEYS {
            let value = if INHERITED_BOX_KEYS.contains(key) {
                inherited(source, page_dict, key)
            } else {
                page_dict.get(key).ok()
            };
            if let Some(value) = value {
                boxes.set(key.to_vec(), objects::resolve_tree(source, value)?);
            }
        }
        if boxes.get(b"MediaBox").is_err() {
            warn!(page = index, "Page has no MediaBox, assuming US Letter");
            boxes.set(
                "MediaBox",
                Object::Array(DEFAULT_MEDIA_BOX.iter().map(|v| Object::Integer(*v)).collect()),
            );
        }

        let content = self.read_content(page_dict, at_page)?;
        let (resources, images) = match inherited(source, page_dict, b"Resources") {
            Some(resources) => self.read_resources(resources, at_page)?,
            None => (Dictionary::new(), Vec::new()),
        };

        let attributes = self.read_attributes(index, page_dict, page_ids);
        let mut page = Page::from_parts(rotation, boxes, resources, images, content)
            .with_attributes(attributes);

        // Entries the content never paints would otherwise dangle.
        if let Some(invoked) = page.invoked_xobjects() {
            let before = page.images().len();
            page.retain_images(|image| invoked.contains(image.name()));
            let pruned = before - page.images().len();
            if pruned > 0 {
                debug!(page = index, pruned, "Dropped images the page never paints");
            }
        }

        Ok(page)
    }

    /// Every page entry the model does not interpret, with links back to page
    /// objects cut. An entry whose object graph cannot be resolved is dropped.
    fn read_attributes(
        &self,
        index: usize,
        page_dict: &Dictionary,
        page_ids: &BTreeSet<ObjectId>,
    ) -> Dictionary {
        let mut attributes = Dictionary::new();
        for (key, value) in page_dict.iter() {
            let key_slice = key.as_slice();
            if MODELLED_PAGE_KEYS.contains(&key_slice) || BOX_KEYS.contains(&key_slice) {
                continue;
            }
            match objects::resolve_detached(&self.document, value, page_ids) {
                Ok(resolved) => attributes.set(key.clone(), resolved),
                Err(err) => warn!(
                    page = index,
                    key = %String::from_utf8_lossy(key),
                    %err,
                    "Dropping unresolvable page entry"
                ),
            }
        }
        attributes
    }

    fn read_rotation(&self, index: usize, page_dict: &Dictionary) -> Rotation {
        let Some(value) = inherited(&self.document, page_dict, b"Rotate") else {
            return Rotation::NONE;
        };
        let degrees = objects::deref(&self.document, value)
            .ok()
            .and_then(objects::integer);
        match degrees.and_then(Rotation::from_degrees) {
            Some(rotation) => rotation,
            None => {
                warn!(page = index, ?degrees, "Invalid /Rotate, resetting to 0");
                Rotation::NONE
            }
        }
    }

    /// Decode and concatenate the page's content stream(s).
    fn read_content(&self, page_dict: &Dictionary, at_page: FormatLocation) -> Result<Vec<u8>> {
        let source = &self.document;
        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(Vec::new());
        };

        let parts: Vec<&Object> = match objects::deref(source, contents)? {
            Object::Array(items) => items.iter().collect(),
            single => vec![single],
        };

        let mut content = Vec::new();
        for (position, part) in parts.into_iter().enumerate() {
            let location = match part {
                Object::Reference(id) => FormatLocation::Object(id.0, id.1),
                _ => at_page,
            };
            let stream = objects::deref(source, part)?.as_stream().map_err(|_| {
                RxPdfError::format(location, "page content is not a stream")
            })?;
            if position > 0 {
                content.push(b'\n');
            }
            content.extend(objects::decoded_content(stream, location)?);
        }
        Ok(content)
    }

    /// Split a resource dictionary into the opaque tree and the raster images.
    fn read_resources(
        &self,
        resources: &Object,
        at_page: FormatLocation,
    ) -> Result<(Dictionary, Vec<ImageResource>)> {
        let source = &self.document;
        let raw = objects::deref(source, resources)?.as_dict().map_err(|_| {
            RxPdfError::format(at_page, "/Resources is not a dictionary")
        })?;

        let mut tree = Dictionary::new();
        let mut images = Vec::new();

        for (category, value) in raw.iter() {
            if category != b"XObject" {
                tree.set(category.clone(), objects::resolve_tree(source, value)?);
                continue;
            }

            let Ok(xobjects) = objects::deref(source, value)?.as_dict() else {
                warn!("/XObject resource is not a dictionary, dropping it");
                continue;
            };
            let mut forms = Dictionary::new();
            for (name, entry) in xobjects.iter() {
                match self.read_image(name, entry)? {
                    Some(image) => images.push(image),
                    None => forms.set(name.clone(), objects::resolve_tree(source, entry)?),
                }
            }
            if !forms.is_empty() {
                tree.set("XObject", forms);
            }
        }

        Ok((tree, images))
    }

    /// Lift an image XObject. Forms, stencil masks and direct (non-indirect)
    /// streams are left to the opaque resource tree.
    fn read_image(&self, name: &[u8], entry: &Object) -> Result<Option<ImageResource>> {
        let source = &self.document;
        let Object::Reference(id) = entry else {
            return Ok(None);
        };
        let Ok(stream) = source.get_object(*id).and_then(Object::as_stream) else {
            return Ok(None);
        };
        if !is_raster_image(&stream.dict) {
            return Ok(None);
        }

        let dict = objects::resolve_dictionary_tree(source, &stream.dict)?;
        ImageResource::from_dictionary(
            name.to_vec(),
            ObjectKey(id.0),
            &dict,
            stream.content.clone(),
            FormatLocation::Object(id.0, id.1),
        )
        .map(Some)
    }
}

/// The `%PDF-` header and `startxref` marker must both be present.
///
/// lopdf only looks for `%%EOF` in the last 512 bytes, with `startxref` just
/// before it, so the tail window rejects nothing the parser would accept.
fn check_markers(data: &[u8]) -> Result<()> {
    let head = &data[..data.len().min(MARKER_WINDOW)];
    if find(head, b"%PDF-").is_none() {
        return Err(RxPdfError::format(
            FormatLocation::Offset(0),
            "missing %PDF- header",
        ));
    }

    let tail_start = data.len().saturating_sub(MARKER_WINDOW);
    if find(&data[tail_start..], b"startxref").is_none() {
        return Err(RxPdfError::format(
            FormatLocation::Offset(tail_start as u64),
            "missing startxref (truncated or no cross-reference section)",
        ));
    }
    Ok(())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Look up `key` on the page, then on each ancestor `/Pages` node.
fn inherited<'a>(
    source: &'a lopdf::Document,
    page_dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = page_dict;
    for _ in 0..MAX_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = source.get_dictionary(parent_id).ok()?;
    }
    None
}
