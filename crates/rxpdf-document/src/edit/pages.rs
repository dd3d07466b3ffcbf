// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page editing — remove, rotate, reorder and append pages.
//
// Each operation takes the document by value and returns the edited one.

use rxpdf_core::error::{Result, RxPdfError};
use tracing::{info, instrument, warn};

use super::merge::concatenate;
use crate::model::Document;
use crate::page_list::{RemovalSet, RotationMap};

/// Keep every page whose index is not in `removals`, preserving order.
///
/// Indices past the end are ignored.
#[instrument(skip_all, fields(pages = document.page_count(), removals = removals.len()))]
pub fn remove_pages(document: Document, removals: &RemovalSet) -> Document {
    let before = document.page_count();
    let kept: Vec<_> = document
        .into_pages()
        .into_iter()
        .enumerate()
        .filter(|(index, _)| !removals.contains(*index))
        .map(|(_, page)| page)
        .collect();
    info!(before, after = kept.len(), "Pages removed");
    Document::from_pages(kept)
}

/// Add each mapped delta to the page's rotation, mod 360.
///
/// Fails with `EmptyDocument` on a document without pages. Indices past the
/// end are skipped with a warning.
#[instrument(skip_all, fields(pages = document.page_count(), entries = rotations.len()))]
pub fn rotate_pages(mut document: Document, rotations: &RotationMap) -> Result<Document> {
    if document.is_empty() {
        return Err(RxPdfError::EmptyDocument);
    }

    let page_count = document.page_count();
    let mut rotated = 0usize;
    for (index, delta) in rotations.iter() {
        match document.pages_mut().get_mut(index) {
            Some(page) => {
                page.set_rotation(page.rotation().then(delta));
                rotated += 1;
            }
            None => warn!(
                page = index + 1,
                page_count, "Rotation names a page past the end, ignoring"
            ),
        }
    }
    info!(rotated, "Pages rotated");
    Ok(document)
}

/// Rearrange pages so that output page `i` is input page `order[i]`.
///
/// `order` must be a permutation of `0..page_count`.
#[instrument(skip_all, fields(pages = document.page_count()))]
pub fn reorder_pages(document: Document, order: &[usize]) -> Result<Document> {
    let page_count = document.page_count();
    if order.len() != page_count {
        return Err(RxPdfError::InvalidPageOrder(format!(
            "ordering lists {} pages but the document has {}",
            order.len(),
            page_count
        )));
    }

    let mut slots: Vec<_> = document.into_pages().into_iter().map(Some).collect();
    let mut pages = Vec::with_capacity(page_count);
    for &index in order {
        let page = slots.get_mut(index).and_then(Option::take).ok_or_else(|| {
            RxPdfError::InvalidPageOrder(if index < page_count {
                format!("page {} listed more than once", index + 1)
            } else {
                format!("page {} does not exist", index + 1)
            })
        })?;
        pages.push(page);
    }
    info!(pages = pages.len(), "Pages reordered");
    Ok(Document::from_pages(pages))
}

/// Append the pages of `other` after those of `document`.
pub fn append_pages(document: Document, other: Document) -> Result<Document> {
    concatenate(vec![document, other])
}
