// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for rxpdf.

use std::fmt;

use thiserror::Error;

/// Where in the input a format problem was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatLocation {
    /// The container as a whole (header, trailer, catalog).
    Document,
    /// A byte offset into the input.
    Offset(u64),
    /// An indirect object (number, generation).
    Object(u32, u16),
    /// A page, 0-based.
    Page(usize),
    /// The n-th input of a multi-input operation, 0-based.
    Input(usize),
}

impl fmt::Display for FormatLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => write!(f, "document"),
            Self::Offset(offset) => write!(f, "byte offset {}", offset),
            Self::Object(number, generation) => write!(f, "object {} {} R", number, generation),
            Self::Page(index) => write!(f, "page index {}", index),
            Self::Input(index) => write!(f, "input #{}", index + 1),
        }
    }
}

/// Top-level error type for all rxpdf operations.
#[derive(Debug, Error)]
pub enum RxPdfError {
    // -- Input errors --
    #[error("malformed input at {location}: {reason}")]
    Format {
        location: FormatLocation,
        reason: String,
    },

    #[error("operation requires at least one page, but the document is empty")]
    EmptyDocument,

    #[error("merge requires at least {required} documents, got {got}")]
    InsufficientInputs { required: usize, got: usize },

    #[error("no valid images supplied")]
    NoValidInputs,

    #[error("cannot normalise image to RGB: {0}")]
    UnsupportedColorSpace(String),

    #[error("resampled image would be {width}x{height}, over the {limit}-pixel limit")]
    ImageTooLarge { width: u32, height: u32, limit: u64 },

    // -- Instruction errors --
    #[error("malformed page specification tokens: {}", tokens.join(", "))]
    InvalidSpec { tokens: Vec<String> },

    #[error("invalid page order: {0}")]
    InvalidPageOrder(String),

    // -- Output errors --
    #[error("encoding failed: {0}")]
    Encode(String),

    // -- Storage / configuration --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl RxPdfError {
    /// Shorthand for a [`RxPdfError::Format`] error.
    pub fn format(location: FormatLocation, reason: impl Into<String>) -> Self {
        Self::Format {
            location,
            reason: reason.into(),
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RxPdfError>;
