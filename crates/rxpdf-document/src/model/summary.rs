// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Serializable overview of a document, for inspection and logging.

use serde::Serialize;

use super::{Document, ImageResource, Page};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    pub page_count: usize,
    pub image_bytes: usize,
    pub pages: Vec<PageSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSummary {
    /// 1-based, matching the page numbers callers type.
    pub number: usize,
    pub rotation: u16,
    pub width_pt: f64,
    pub height_pt: f64,
    pub content_bytes: usize,
    pub images: Vec<ImageSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSummary {
    pub name: String,
    pub key: u32,
    pub width: u32,
    pub height: u32,
    pub color_space: String,
    pub bits_per_component: u8,
    pub filters: Vec<String>,
    pub bytes: usize,
}

impl DocumentSummary {
    pub fn of(document: &Document) -> Self {
        let pages: Vec<PageSummary> = document
            .pages()
            .iter()
            .enumerate()
            .map(|(index, page)| PageSummary::of(index, page))
            .collect();
        Self {
            page_count: pages.len(),
            image_bytes: pages
                .iter()
                .flat_map(|page| &page.images)
                .map(|image| image.bytes)
                .sum(),
            pages,
        }
    }
}

impl PageSummary {
    fn of(index: usize, page: &Page) -> Self {
        let (width_pt, height_pt) = page.size();
        Self {
            number: index + 1,
            rotation: page.rotation().degrees(),
            width_pt,
            height_pt,
            content_bytes: page.content().len(),
            images: page.images().iter().map(ImageSummary::of).collect(),
        }
    }
}

impl ImageSummary {
    fn of(image: &ImageResource) -> Self {
        Self {
            name: String::from_utf8_lossy(image.name()).into_owned(),
            key: image.key().0,
            width: image.width(),
            height: image.height(),
            color_space: image.format().color_space.name(),
            bits_per_component: image.format().bits_per_component,
            filters: image
                .filters()
                .iter()
                .map(|filter| String::from_utf8_lossy(filter).into_owned())
                .collect(),
            bytes: image.data().len(),
        }
    }
}
