// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode, flatten to RGB, resample and JPEG-encode
// in-memory images using the `image` crate.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use rxpdf_core::error::{FormatLocation, Result, RxPdfError};
use tracing::{debug, instrument};

/// Largest image, in pixels, a resample may produce (32 Mpx, about 96 MiB of RGB).
pub const MAX_OUTPUT_PIXELS: u64 = 1 << 25;

/// Image pipeline operating on a single in-memory image.
///
/// Each transformation consumes `self` and returns a new processor, so steps
/// chain:
///
/// ```ignore
/// let jpeg = ImageProcessor::from_bytes(&png, FormatLocation::Input(0))?
///     .flatten()
///     .rescale(0.5)?
///     .to_jpeg_bytes(75)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Decode encoded bytes (JPEG, PNG, TIFF, ...), sniffing the format.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8], location: FormatLocation) -> Result<Self> {
        let image = image::load_from_memory(data).map_err(|err| {
            RxPdfError::format(location, format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = image.width(),
            height = image.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image })
    }

    /// Decode a baseline or progressive JPEG (a `DCTDecode` stream).
    pub fn from_jpeg(data: &[u8], location: FormatLocation) -> Result<Self> {
        let image =
            image::load_from_memory_with_format(data, ImageFormat::Jpeg).map_err(|err| {
                RxPdfError::format(location, format!("failed to decode JPEG data: {}", err))
            })?;
        Ok(Self { image })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Convert to 8-bit RGB, compositing any alpha channel over white.
    pub fn flatten(self) -> Self {
        if !self.image.color().has_alpha() {
            return Self {
                image: DynamicImage::ImageRgb8(self.image.to_rgb8()),
            };
        }

        let rgba = self.image.to_rgba8();
        let flattened = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let [r, g, b, a] = rgba.get_pixel(x, y).0;
            let over_white = |channel: u8| -> u8 {
                let alpha = u16::from(a);
                let value = u16::from(channel) * alpha + 255 * (255 - alpha);
                ((value + 127) / 255) as u8
            };
            Rgb([over_white(r), over_white(g), over_white(b)])
        });
        Self {
            image: DynamicImage::ImageRgb8(flattened),
        }
    }

    /// Scale both dimensions by `scale` with Lanczos3 filtering.
    ///
    /// New dimensions are `max(1, floor(dim * scale))`; a scale of exactly 1
    /// leaves the image untouched. Targets over [`MAX_OUTPUT_PIXELS`] fail
    /// with [`RxPdfError::ImageTooLarge`] before anything is allocated.
    pub fn rescale(self, scale: f64) -> Result<Self> {
        if scale == 1.0 {
            return Ok(self);
        }
        let (width, height) = scaled_dimensions(self.width(), self.height(), scale);
        if u64::from(width) * u64::from(height) > MAX_OUTPUT_PIXELS {
            return Err(RxPdfError::ImageTooLarge {
                width,
                height,
                limit: MAX_OUTPUT_PIXELS,
            });
        }
        debug!(
            from_w = self.width(),
            from_h = self.height(),
            width,
            height,
            "Resampling image"
        );
        Ok(self.resize_exact(width, height))
    }

    /// Resize to exactly `width` x `height`, ignoring aspect ratio.
    pub fn resize_exact(self, width: u32, height: u32) -> Self {
        let resized = self
            .image
            .resize_exact(width, height, FilterType::Lanczos3);
        Self { image: resized }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode as baseline JPEG. `quality` is clamped to 1-100.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)
            .map_err(|err| RxPdfError::Encode(format!("JPEG encoding failed: {}", err)))?;
        Ok(buffer)
    }
}

/// Target dimensions for a resample by `scale`.
pub fn scaled_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let scale_one = |dimension: u32| -> u32 {
        let scaled = (f64::from(dimension) * scale).floor();
        if scaled < 1.0 {
            1
        } else if scaled >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            scaled as u32
        }
    };
    (scale_one(width), scale_one(height))
}
