// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edit module — page editing, merging and image assembly.

pub mod assemble;
pub mod merge;
pub mod pages;

pub use assemble::assemble;
pub use merge::{merge, merge_at_least};
pub use pages::{append_pages, remove_pages, reorder_pages, rotate_pages};
