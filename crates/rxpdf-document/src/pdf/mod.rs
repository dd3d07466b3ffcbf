// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — reading containers into the model and writing them back out.

pub(crate) mod objects;
pub mod reader;
pub mod writer;

pub use reader::{PdfReader, load};
pub use writer::{PdfWriter, SerializeOptions, serialize};
