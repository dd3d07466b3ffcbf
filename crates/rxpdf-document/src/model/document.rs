// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The in-memory document: an ordered sequence of pages.

use std::fmt;

use rxpdf_core::error::{Result, RxPdfError};

use super::Page;

/// Document-wide identity of an image object.
///
/// Loaded documents use the source object number; the serializer writes each
/// distinct key exactly once, so two images must never share a key unless they
/// really are the same object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey(pub u32);

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An ordered sequence of pages that exclusively owns them.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pages: Vec<Page>,
}

impl Document {
    /// A document with no pages.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pages(pages: Vec<Page>) -> Self {
        Self { pages }
    }

    // -- Inspection -----------------------------------------------------------

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Page at a 0-based index.
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }

    pub(crate) fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }

    /// Highest image key in use, if any page carries images.
    pub fn max_object_key(&self) -> Option<ObjectKey> {
        self.pages
            .iter()
            .flat_map(|page| page.images())
            .map(|image| image.key())
            .max()
    }

    /// Every `(page index, name)` pair where an image is declared but never
    /// painted, or painted but never declared.
    pub fn dangling_image_references(&self) -> Vec<(usize, Vec<u8>)> {
        self.pages
            .iter()
            .enumerate()
            .flat_map(|(index, page)| {
                page.unused_images()
                    .into_iter()
                    .chain(page.missing_xobjects())
                    .map(move |name| (index, name))
            })
            .collect()
    }

    // -- Key namespace --------------------------------------------------------

    /// Shift every image key by `offset`, moving this document into a fresh
    /// key namespace.
    pub(crate) fn offset_object_keys(&mut self, offset: u32) -> Result<()> {
        if offset == 0 {
            return Ok(());
        }
        for page in &mut self.pages {
            for image in page.images_mut() {
                let shifted = image.key().0.checked_add(offset).ok_or_else(|| {
                    RxPdfError::Encode(format!(
                        "object key {} overflows when shifted by {}",
                        image.key(),
                        offset
                    ))
                })?;
                image.set_key(ObjectKey(shifted));
            }
        }
        Ok(())
    }
}

impl From<Vec<Page>> for Document {
    fn from(pages: Vec<Page>) -> Self {
        Self::from_pages(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageResource, PixelFormat};

    fn page_with_key(key: u32) -> Page {
        Page::new(10, 10)
            .with_content(b"/Im0 Do".to_vec())
            .with_image(ImageResource::new(
                "Im0",
                ObjectKey(key),
                vec![0; 3],
                1,
                1,
                PixelFormat::rgb8(),
                Vec::new(),
            ))
    }

    #[test]
    fn empty_document_has_no_keys() {
        let document = Document::new();
        assert!(document.is_empty());
        assert_eq!(document.max_object_key(), None);
    }

    #[test]
    fn offset_moves_every_key() {
        let mut document = Document::from_pages(vec![page_with_key(3), page_with_key(7)]);
        document.offset_object_keys(10).unwrap();
        let keys: Vec<u32> = document
            .pages()
            .iter()
            .map(|page| page.images()[0].key().0)
            .collect();
        assert_eq!(keys, vec![13, 17]);
        assert_eq!(document.max_object_key(), Some(ObjectKey(17)));
    }

    #[test]
    fn offset_overflow_is_reported() {
        let mut document = Document::from_pages(vec![page_with_key(u32::MAX)]);
        assert!(document.offset_object_keys(1).is_err());
    }

    #[test]
    fn painted_images_are_not_dangling() {
        let document = Document::from_pages(vec![page_with_key(1)]);
        assert!(document.dangling_image_references().is_empty());
    }
}
