// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — serialise the document model into a fresh `lopdf` container.
//
// Output is deterministic: object numbers follow page order, no timestamps or
// file identifiers are written, and no /Info dictionary is emitted.

use std::collections::HashMap;

use lopdf::{Dictionary, Object, ObjectId, Stream, dictionary};
use rxpdf_core::EngineConfig;
use rxpdf_core::error::{Result, RxPdfError};
use tracing::{debug, info, instrument};

use super::objects::StreamTable;
use crate::model::{Document, ObjectKey, Page};

/// Output settings for [`PdfWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Flate-compress streams that carry no filter (page content).
    pub compress_streams: bool,
    /// Version written to the `%PDF-` header.
    pub pdf_version: String,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            compress_streams: true,
            pdf_version: "1.5".to_string(),
        }
    }
}

impl From<&EngineConfig> for SerializeOptions {
    fn from(config: &EngineConfig) -> Self {
        Self {
            compress_streams: config.compress_streams,
            pdf_version: config.pdf_version.clone(),
        }
    }
}

/// Serialise `document` with default options.
pub fn serialize(document: &Document) -> Result<Vec<u8>> {
    PdfWriter::new(SerializeOptions::default()).serialize(document)
}

/// Writes a [`Document`] as a complete PDF container.
pub struct PdfWriter {
    options: SerializeOptions,
}

impl PdfWriter {
    pub fn new(options: SerializeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SerializeOptions {
        &self.options
    }

    /// Build the container and return its bytes.
    #[instrument(skip_all, fields(pages = document.page_count()))]
    pub fn serialize(&self, document: &Document) -> Result<Vec<u8>> {
        let mut output = lopdf::Document::with_version(self.options.pdf_version.as_str());
        let pages_id = output.new_object_id();

        let mut session = WriteSession {
            output: &mut output,
            streams: StreamTable::default(),
            images: HashMap::new(),
        };

        let mut kids = Vec::with_capacity(document.page_count());
        for page in document.pages() {
            let page_id = session.write_page(page, pages_id);
            kids.push(Object::Reference(page_id));
        }
        let image_objects = session.images.len();

        output.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(document.page_count() as i64),
            }),
        );
        let catalog_id = output.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        output.trailer.set("Root", catalog_id);

        if self.options.compress_streams {
            output.compress();
        }

        let mut bytes = Vec::new();
        output.save_to(&mut bytes).map_err(|err| {
            RxPdfError::Encode(format!("failed to serialise PDF: {}", err))
        })?;

        info!(
            pages = document.page_count(),
            image_objects,
            output_bytes = bytes.len(),
            "Document serialised"
        );
        Ok(bytes)
    }
}

/// Per-call state: the container under construction and what it already holds.
struct WriteSession<'a> {
    output: &'a mut lopdf::Document,
    streams: StreamTable,
    /// Image key → object written for it.
    images: HashMap<ObjectKey, ObjectId>,
}

impl WriteSession<'_> {
    fn write_page(&mut self, page: &Page, pages_id: ObjectId) -> ObjectId {
        let mut resources = self.streams.hoist_dictionary(self.output, page.resources());

        let mut xobjects = match resources.remove(b"XObject") {
            Some(Object::Dictionary(forms)) => forms,
            _ => Dictionary::new(),
        };
        for image in page.images() {
            let image_id = self.write_image(image.key(), image.to_stream());
            xobjects.set(image.name().to_vec(), Object::Reference(image_id));
        }
        if !xobjects.is_empty() {
            resources.set("XObject", xobjects);
        }

        let content_id = self
            .output
            .add_object(Stream::new(Dictionary::new(), page.content().to_vec()));

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        };
        for (key, value) in page.boxes().iter() {
            page_dict.set(key.clone(), self.streams.hoist(self.output, value));
        }
        for (key, value) in page.attributes().iter() {
            let value = match value {
                Object::Array(items) if key == b"Annots" => self.write_annotations(items),
                other => self.streams.hoist(self.output, other),
            };
            page_dict.set(key.clone(), value);
        }
        if page.rotation().degrees() != 0 {
            page_dict.set("Rotate", Object::Integer(i64::from(page.rotation().degrees())));
        }
        page_dict.set("Resources", resources);
        page_dict.set("Contents", content_id);

        self.output.add_object(page_dict)
    }

    /// Annotation dictionaries become indirect objects, as `/Annots` requires.
    fn write_annotations(&mut self, items: &[Object]) -> Object {
        Object::Array(
            items
                .iter()
                .map(|item| match item {
                    Object::Dictionary(annotation) => {
                        let annotation = self.streams.hoist_dictionary(self.output, annotation);
                        Object::Reference(self.output.add_object(annotation))
                    }
                    other => self.streams.hoist(self.output, other),
                })
                .collect(),
        )
    }

    /// Write an image object once per key; later pages reuse it.
    fn write_image(&mut self, key: ObjectKey, mut stream: Stream) -> ObjectId {
        if let Some(id) = self.images.get(&key) {
            return *id;
        }
        stream.dict = self.streams.hoist_dictionary(self.output, &stream.dict);
        let id = self.output.add_object(stream);
        self.images.insert(key, id);
        debug!(%key, ?id, "Image object written");
        id
    }
}
