// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Merge several documents into one, in input order.

use rxpdf_core::error::{Result, RxPdfError};
use tracing::{debug, info, instrument};

use crate::model::Document;

/// Fewest documents [`merge`] accepts.
pub const DEFAULT_MIN_INPUTS: usize = 2;

/// Merge with the default minimum of two inputs.
pub fn merge(documents: Vec<Document>) -> Result<Document> {
    merge_at_least(documents, DEFAULT_MIN_INPUTS)
}

/// Concatenate the page sequences of `documents`.
///
/// Fails with `InsufficientInputs` when fewer than `minimum` are given.
#[instrument(skip(documents), fields(inputs = documents.len()))]
pub fn merge_at_least(documents: Vec<Document>, minimum: usize) -> Result<Document> {
    if documents.len() < minimum {
        return Err(RxPdfError::InsufficientInputs {
            required: minimum,
            got: documents.len(),
        });
    }
    let merged = concatenate(documents)?;
    info!(pages = merged.page_count(), "Documents merged");
    Ok(merged)
}

/// Join page sequences, moving each later document's image keys past every
/// key already taken so images from different sources never share a key.
pub(crate) fn concatenate(documents: Vec<Document>) -> Result<Document> {
    let mut pages = Vec::with_capacity(documents.iter().map(Document::page_count).sum());
    let mut next_free: u32 = 0;

    for (index, mut document) in documents.into_iter().enumerate() {
        document.offset_object_keys(next_free)?;
        if let Some(highest) = document.max_object_key() {
            next_free = highest.0.checked_add(1).ok_or_else(|| {
                RxPdfError::Encode("image key space exhausted while merging".to_string())
            })?;
        }
        debug!(
            input = index,
            pages = document.page_count(),
            next_free,
            "Appending document"
        );
        pages.extend(document.into_pages());
    }

    Ok(Document::from_pages(pages))
}
