// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine — byte-in, byte-out entry points over the document operations.
//
// Every call loads its inputs, transforms the model and serialises the
// result. The engine holds only its configuration, so one instance can
// serve concurrent callers working on distinct documents.

use rxpdf_core::error::{Result, RxPdfError};
use rxpdf_core::{CompressOptions, EngineConfig, SpecParseMode};
use tracing::{info, instrument};

use crate::codec::recompress;
use crate::edit;
use crate::model::{Document, DocumentSummary};
use crate::page_list::{self, RemovalSet, RotationMap};
use crate::pdf::{PdfWriter, SerializeOptions, load};

/// One engine request, with its inputs already typed.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Downsample and re-encode every image in `document`.
    Compress {
        document: Vec<u8>,
        options: CompressOptions,
    },
    /// Concatenate `documents` in order.
    Merge { documents: Vec<Vec<u8>> },
    /// Drop the pages at the given 0-based indices.
    RemovePages { document: Vec<u8>, pages: RemovalSet },
    /// Add per-page rotation deltas.
    RotatePages {
        document: Vec<u8>,
        rotations: RotationMap,
    },
    /// Rearrange pages; `order` is a permutation of 0-based indices.
    ReorderPages { document: Vec<u8>, order: Vec<usize> },
    /// Build a document with one page per encoded image.
    Assemble { images: Vec<Vec<u8>> },
}

impl Operation {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Compress { .. } => "compress",
            Self::Merge { .. } => "merge",
            Self::RemovePages { .. } => "remove-pages",
            Self::RotatePages { .. } => "rotate-pages",
            Self::ReorderPages { .. } => "reorder-pages",
            Self::Assemble { .. } => "assemble",
        }
    }
}

/// PDF transformation engine configured once at construction.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run `operation` and return the serialised result.
    #[instrument(skip_all, fields(operation = operation.name()))]
    pub fn execute(&self, operation: Operation) -> Result<Vec<u8>> {
        let document = match operation {
            Operation::Compress { document, options } => {
                recompress(load(&document)?, &options)?
            }
            Operation::Merge { documents } => {
                if documents.len() < self.config.min_merge_inputs {
                    // Checked before any input is parsed.
                    return Err(RxPdfError::InsufficientInputs {
                        required: self.config.min_merge_inputs,
                        got: documents.len(),
                    });
                }
                let loaded = documents
                    .iter()
                    .map(|bytes| load(bytes))
                    .collect::<Result<Vec<_>>>()?;
                edit::merge_at_least(loaded, self.config.min_merge_inputs)?
            }
            Operation::RemovePages { document, pages } => {
                edit::remove_pages(load(&document)?, &pages)
            }
            Operation::RotatePages {
                document,
                rotations,
            } => edit::rotate_pages(load(&document)?, &rotations)?,
            Operation::ReorderPages { document, order } => {
                edit::reorder_pages(load(&document)?, &order)?
            }
            Operation::Assemble { images } => {
                edit::assemble(&images, self.config.assemble_quality)?
            }
        };
        self.serialize(&document)
    }

    // -- Convenience entry points ---------------------------------------------

    /// Recompress images at `dpi` and JPEG `quality`.
    pub fn recompress(&self, document: &[u8], dpi: u32, quality: u8) -> Result<Vec<u8>> {
        self.execute(Operation::Compress {
            document: document.to_vec(),
            options: CompressOptions {
                dpi,
                quality,
                only_if_smaller: self.config.only_if_smaller,
            },
        })
    }

    /// Recompress with the configured default DPI and quality.
    pub fn recompress_with_defaults(&self, document: &[u8]) -> Result<Vec<u8>> {
        self.recompress(
            document,
            self.config.default_dpi,
            self.config.default_quality,
        )
    }

    pub fn merge<B: AsRef<[u8]>>(&self, documents: &[B]) -> Result<Vec<u8>> {
        self.execute(Operation::Merge {
            documents: documents.iter().map(|d| d.as_ref().to_vec()).collect(),
        })
    }

    /// Remove the 1-based pages listed in `spec` ("2,4,6").
    pub fn remove_pages(&self, document: &[u8], spec: &str) -> Result<Vec<u8>> {
        let pages = self.parse_removals(spec)?;
        self.execute(Operation::RemovePages {
            document: document.to_vec(),
            pages,
        })
    }

    /// Rotate pages per `spec` ("1:90,3:270", 1-based pages).
    pub fn rotate_pages(&self, document: &[u8], spec: &str) -> Result<Vec<u8>> {
        let rotations = self.parse_rotations(spec)?;
        self.execute(Operation::RotatePages {
            document: document.to_vec(),
            rotations,
        })
    }

    /// Reorder pages per `spec` ("3,1,2", 1-based). Malformed tokens always fail.
    pub fn reorder_pages(&self, document: &[u8], spec: &str) -> Result<Vec<u8>> {
        let order = page_list::parse_page_order(spec)?;
        self.execute(Operation::ReorderPages {
            document: document.to_vec(),
            order,
        })
    }

    pub fn assemble_from_images<B: AsRef<[u8]>>(&self, images: &[B]) -> Result<Vec<u8>> {
        self.execute(Operation::Assemble {
            images: images.iter().map(|i| i.as_ref().to_vec()).collect(),
        })
    }

    /// Load `document` and describe its pages and images.
    pub fn inspect(&self, document: &[u8]) -> Result<DocumentSummary> {
        Ok(DocumentSummary::of(&load(document)?))
    }

    // -- Helpers --------------------------------------------------------------

    pub fn parse_rotations(&self, spec: &str) -> Result<RotationMap> {
        match self.config.spec_parse_mode {
            SpecParseMode::Lenient => Ok(page_list::parse_rotation_spec(spec)),
            SpecParseMode::Strict => page_list::parse_rotation_spec_strict(spec),
        }
    }

    pub fn parse_removals(&self, spec: &str) -> Result<RemovalSet> {
        match self.config.spec_parse_mode {
            SpecParseMode::Lenient => Ok(page_list::parse_removal_spec(spec)),
            SpecParseMode::Strict => page_list::parse_removal_spec_strict(spec),
        }
    }

    fn serialize(&self, document: &Document) -> Result<Vec<u8>> {
        let bytes = PdfWriter::new(SerializeOptions::from(&self.config)).serialize(document)?;
        info!(
            pages = document.page_count(),
            output_bytes = bytes.len(),
            "Operation complete"
        );
        Ok(bytes)
    }
}
