// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core value types for the rxpdf engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Page rotation, always one of 0, 90, 180 or 270 degrees clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rotation(u16);

impl Rotation {
    /// No rotation.
    pub const NONE: Rotation = Rotation(0);

    /// Normalise `degrees` mod 360. Returns `None` unless it is a multiple of 90.
    pub fn from_degrees(degrees: i64) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        Some(Self(degrees.rem_euclid(360) as u16))
    }

    /// Rotation in degrees (0, 90, 180 or 270).
    pub fn degrees(self) -> u16 {
        self.0
    }

    /// Add a clockwise delta. Returns `None` unless the delta is a multiple of 90.
    pub fn rotated_by(self, delta: i32) -> Option<Self> {
        Self::from_degrees(i64::from(self.0) + i64::from(delta))
    }

    /// Apply `other` after `self`.
    pub fn then(self, other: Rotation) -> Self {
        Self((self.0 + other.0) % 360)
    }
}

impl TryFrom<i64> for Rotation {
    type Error = String;

    fn try_from(degrees: i64) -> Result<Self, Self::Error> {
        Self::from_degrees(degrees)
            .ok_or_else(|| format!("rotation {} is not a multiple of 90", degrees))
    }
}

impl From<Rotation> for i64 {
    fn from(rotation: Rotation) -> Self {
        i64::from(rotation.0)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// How page specification strings ("2,4,6", "1:90,3:270") treat malformed tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecParseMode {
    /// Drop malformed tokens silently and keep the rest.
    #[default]
    Lenient,
    /// Reject the whole string, reporting every malformed token.
    Strict,
}

/// Parameters for image recompression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressOptions {
    /// Target resolution; images are scaled by `dpi / 72`.
    pub dpi: u32,
    /// JPEG quality, 0-100 (clamped to 1-100 by the encoder).
    pub quality: u8,
    /// Keep an image's original bytes when re-encoding does not shrink it.
    pub only_if_smaller: bool,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            dpi: 72,
            quality: 50,
            only_if_smaller: false,
        }
    }
}

impl CompressOptions {
    /// Scale factor applied to image dimensions.
    pub fn scale(&self) -> f64 {
        f64::from(self.dpi) / 72.0
    }
}
