// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// rxpdf-document — PDF transformation engine.
//
// Loads PDF containers into an owned page model, recompresses embedded images,
// removes/rotates/reorders pages, merges documents, assembles documents from
// raster images, and serialises the result deterministically.

pub mod codec;
pub mod edit;
pub mod engine;
pub mod model;
pub mod page_list;
pub mod pdf;

#[cfg(test)]
mod test_support;

// Re-export the primary types so callers can use `rxpdf_document::Engine` etc.
pub use codec::{ImageProcessor, recompress};
pub use edit::{
    append_pages, assemble, merge, merge_at_least, remove_pages, reorder_pages, rotate_pages,
};
pub use engine::{Engine, Operation};
pub use model::{ColorSpace, Document, DocumentSummary, ImageResource, ObjectKey, Page, PixelFormat};
pub use page_list::{
    RemovalSet, RotationMap, parse_page_order, parse_removal_spec, parse_removal_spec_strict,
    parse_rotation_spec, parse_rotation_spec_strict,
};
pub use pdf::{PdfReader, PdfWriter, SerializeOptions, load, serialize};
