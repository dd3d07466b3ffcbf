// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Codec module — decoding embedded images, resampling and JPEG re-encoding.

pub mod decode;
pub mod processor;
pub mod recompress;

pub use decode::decode_image;
pub use processor::ImageProcessor;
pub use recompress::recompress;
