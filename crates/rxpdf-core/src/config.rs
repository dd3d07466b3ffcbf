// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::SpecParseMode;

/// Settings supplied to the engine at construction time.
///
/// Every field has a default, so a configuration file only needs to name the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Target resolution for image recompression (source assumed 72 DPI).
    pub default_dpi: u32,
    /// JPEG quality for image recompression (0-100).
    pub default_quality: u8,
    /// Keep an image's original bytes when re-encoding does not shrink it.
    pub only_if_smaller: bool,
    /// Minimum number of documents a merge accepts.
    pub min_merge_inputs: usize,
    /// JPEG quality used when assembling images into a new document.
    pub assemble_quality: u8,
    /// How rotation/removal specification strings treat malformed tokens.
    pub spec_parse_mode: SpecParseMode,
    /// Flate-compress page content streams on output.
    pub compress_streams: bool,
    /// Version written to the `%PDF-` header.
    pub pdf_version: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_dpi: 72,
            default_quality: 50,
            only_if_smaller: false,
            min_merge_inputs: 2,
            assemble_quality: 90,
            spec_parse_mode: SpecParseMode::Lenient,
            compress_streams: true,
            pdf_version: "1.5".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }
}
