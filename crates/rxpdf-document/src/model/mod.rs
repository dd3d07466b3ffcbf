// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document model — pages, embedded images, and their identities.

pub mod document;
pub mod image;
pub mod page;
pub mod summary;

pub use document::{Document, ObjectKey};
pub use image::{ColorSpace, ImageResource, PixelFormat};
pub use page::Page;
pub use summary::{DocumentSummary, ImageSummary, PageSummary};
