// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Decode embedded PDF image streams into pixels.
//
// JPEG data goes through the `image` crate; every other supported filter is
// undone by lopdf and the raw samples are interpreted by colour space.

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::Object;
use rxpdf_core::error::{FormatLocation, Result, RxPdfError};

use super::processor::ImageProcessor;
use crate::model::{ColorSpace, ImageResource};
use crate::pdf::objects;

/// Filters lopdf can undo, full and abbreviated names.
const STREAM_FILTERS: &[&[u8]] = &[
    b"FlateDecode",
    b"Fl",
    b"LZWDecode",
    b"LZW",
    b"ASCIIHexDecode",
    b"AHx",
    b"ASCII85Decode",
    b"A85",
    b"RunLengthDecode",
    b"RL",
];

/// Decode `image` into an 8-bit grey or RGB raster.
pub fn decode_image(image: &ImageResource, location: FormatLocation) -> Result<DynamicImage> {
    match image.filters() {
        [only] if only.as_slice() == b"DCTDecode" || only.as_slice() == b"DCT" => {
            let mut pixels = ImageProcessor::from_jpeg(image.data(), location)?.into_dynamic();
            // Adobe CMYK JPEGs are stored inverted and flagged with `/Decode [1 0 ...]`.
            let components = image.format().color_space.components().unwrap_or(0);
            if decode_is_inverted(image, components) {
                pixels.invert();
            }
            Ok(pixels)
        }
        chain => {
            if let Some(filter) = chain
                .iter()
                .find(|filter| !STREAM_FILTERS.contains(&filter.as_slice()))
            {
                return Err(RxPdfError::UnsupportedColorSpace(format!(
                    "{} image data",
                    String::from_utf8_lossy(filter)
                )));
            }
            let samples = objects::decoded_content(&image.to_stream(), location)?;
            samples_to_image(image, &samples, location)
        }
    }
}

/// Interpret raw samples according to the declared pixel format.
fn samples_to_image(
    image: &ImageResource,
    samples: &[u8],
    location: FormatLocation,
) -> Result<DynamicImage> {
    let (width, height) = (image.width(), image.height());
    let bits = image.format().bits_per_component;
    let space = &image.format().color_space;

    let unsupported = || {
        RxPdfError::UnsupportedColorSpace(format!("{} at {} bits per component", space.name(), bits))
    };

    match space {
        ColorSpace::Indexed {
            base,
            hival,
            lookup,
        } => {
            if !matches!(bits, 1 | 2 | 4 | 8) {
                return Err(unsupported());
            }
            let indices = unpack(samples, width, height, 1, bits, location)?;
            expand_palette(base, *hival, lookup, &indices, width, height, location)
        }
        other => {
            let components = other.components().ok_or_else(unsupported)?;
            let supported = bits == 8 || (components == 1 && matches!(bits, 1 | 2 | 4));
            if !supported {
                return Err(unsupported());
            }
            let mut values = unpack(samples, width, height, components, bits, location)?;
            if bits < 8 {
                let max = (1u16 << bits) - 1;
                for value in &mut values {
                    *value = (u16::from(*value) * 255 / max) as u8;
                }
            }
            if decode_is_inverted(image, components) {
                for value in &mut values {
                    *value = 255 - *value;
                }
            }
            device_image(components, values, width, height, location)
        }
    }
}

/// Build an image from 8-bit device samples with 1, 3 or 4 channels.
fn device_image(
    components: u8,
    values: Vec<u8>,
    width: u32,
    height: u32,
    location: FormatLocation,
) -> Result<DynamicImage> {
    let mismatch = || RxPdfError::format(location, "image sample buffer has the wrong size");
    match components {
        1 => GrayImage::from_raw(width, height, values)
            .map(DynamicImage::ImageLuma8)
            .ok_or_else(mismatch),
        3 => RgbImage::from_raw(width, height, values)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(mismatch),
        4 => RgbImage::from_raw(width, height, cmyk_to_rgb(&values))
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(mismatch),
        n => Err(RxPdfError::UnsupportedColorSpace(format!(
            "{} colour components",
            n
        ))),
    }
}

/// Look every index up in the palette, producing RGB or grey pixels.
fn expand_palette(
    base: &ColorSpace,
    hival: u8,
    lookup: &[u8],
    indices: &[u8],
    width: u32,
    height: u32,
    location: FormatLocation,
) -> Result<DynamicImage> {
    let channels = match base {
        ColorSpace::Indexed { .. } | ColorSpace::Other(_) => None,
        other => other.components(),
    }
    .ok_or_else(|| {
        RxPdfError::UnsupportedColorSpace(format!("Indexed over {}", base.name()))
    })?;

    let entries = usize::from(hival) + 1;
    let stride = usize::from(channels);
    if lookup.len() < entries * stride {
        return Err(RxPdfError::format(
            location,
            format!(
                "palette has {} bytes, expected {}",
                lookup.len(),
                entries * stride
            ),
        ));
    }

    let mut values = Vec::with_capacity(indices.len() * stride);
    for index in indices {
        let entry = usize::from(*index).min(usize::from(hival));
        values.extend_from_slice(&lookup[entry * stride..(entry + 1) * stride]);
    }
    device_image(channels, values, width, height, location)
}

/// Unpack `bits`-wide samples into one byte each, honouring byte-aligned rows.
fn unpack(
    samples: &[u8],
    width: u32,
    height: u32,
    components: u8,
    bits: u8,
    location: FormatLocation,
) -> Result<Vec<u8>> {
    let per_row = width as usize * usize::from(components);
    let row_bytes = (per_row * usize::from(bits)).div_ceil(8);
    let needed = row_bytes * height as usize;
    if samples.len() < needed {
        return Err(RxPdfError::format(
            location,
            format!(
                "image data truncated: {} bytes, expected {}",
                samples.len(),
                needed
            ),
        ));
    }

    if bits == 8 {
        return Ok(samples[..needed].to_vec());
    }

    let mask = (1u8 << bits) - 1;
    let per_byte = 8 / usize::from(bits);
    let mut values = Vec::with_capacity(per_row * height as usize);
    for row in samples[..needed].chunks_exact(row_bytes) {
        for sample in 0..per_row {
            let byte = row[sample / per_byte];
            let shift = 8 - usize::from(bits) * (sample % per_byte + 1);
            values.push((byte >> shift) & mask);
        }
    }
    Ok(values)
}

/// True when `/Decode` swaps every channel's range (`[1 0 ...]`).
fn decode_is_inverted(image: &ImageResource, components: u8) -> bool {
    let Ok(Object::Array(ranges)) = image.attributes().get(b"Decode") else {
        return false;
    };
    if ranges.len() != usize::from(components) * 2 {
        return false;
    }
    ranges.chunks_exact(2).all(|pair| {
        matches!(
            (objects::integer(&pair[0]), objects::integer(&pair[1])),
            (Some(1), Some(0))
        )
    })
}

/// Naive CMYK to RGB, without a colour profile.
fn cmyk_to_rgb(values: &[u8]) -> Vec<u8> {
    values
        .chunks_exact(4)
        .flat_map(|cmyk| {
            let k = 255 - u16::from(cmyk[3]);
            let channel = |c: u8| ((255 - u16::from(c)) * k / 255) as u8;
            [channel(cmyk[0]), channel(cmyk[1]), channel(cmyk[2])]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ObjectKey, PixelFormat};
    use lopdf::Dictionary;

    fn raw_image(
        data: Vec<u8>,
        width: u32,
        height: u32,
        color_space: ColorSpace,
        bits: u8,
    ) -> ImageResource {
        ImageResource::new(
            "Im0",
            ObjectKey(1),
            data,
            width,
            height,
            PixelFormat {
                color_space,
                bits_per_component: bits,
            },
            Vec::new(),
        )
    }

    fn decode(image: &ImageResource) -> Result<DynamicImage> {
        decode_image(image, FormatLocation::Page(0))
    }

    #[test]
    fn rgb_samples_decode_verbatim() {
        let image = raw_image(vec![255, 0, 0, 0, 0, 255], 2, 1, ColorSpace::DeviceRgb, 8);
        let rgb = decode(&image).unwrap().to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(rgb.get_pixel(1, 0).0, [0, 0, 255]);
    }

    #[test]
    fn one_bit_gray_rows_are_byte_aligned() {
        // 3 pixels per row: 1,0,1 then 0,1,0; each row padded to a byte.
        let image = raw_image(vec![0b1010_0000, 0b0100_0000], 3, 2, ColorSpace::DeviceGray, 1);
        let gray = decode(&image).unwrap().to_luma8();
        assert_eq!(gray.get_pixel(0, 0).0, [255]);
        assert_eq!(gray.get_pixel(1, 0).0, [0]);
        assert_eq!(gray.get_pixel(1, 1).0, [255]);
    }

    #[test]
    fn inverted_decode_array_flips_gray() {
        let mut attributes = Dictionary::new();
        attributes.set(
            "Decode",
            Object::Array(vec![Object::Integer(1), Object::Integer(0)]),
        );
        let image = raw_image(vec![0], 1, 1, ColorSpace::DeviceGray, 8).with_attributes(attributes);
        assert_eq!(decode(&image).unwrap().to_luma8().get_pixel(0, 0).0, [255]);
    }

    #[test]
    fn inverted_decode_array_applies_to_jpeg_data() {
        use image::Luma;
        use image::codecs::jpeg::JpegEncoder;

        let mut jpeg = Vec::new();
        GrayImage::from_pixel(8, 8, Luma([250]))
            .write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, 95))
            .unwrap();
        let mut attributes = Dictionary::new();
        attributes.set(
            "Decode",
            Object::Array(vec![Object::Integer(1), Object::Integer(0)]),
        );
        let image = ImageResource::new(
            "Im0",
            ObjectKey(1),
            jpeg,
            8,
            8,
            PixelFormat {
                color_space: ColorSpace::DeviceGray,
                bits_per_component: 8,
            },
            vec![b"DCTDecode".to_vec()],
        )
        .with_attributes(attributes);

        let [value] = decode(&image).unwrap().to_luma8().get_pixel(4, 4).0;
        assert!(value < 20, "expected an inverted (dark) pixel, got {}", value);
    }

    #[test]
    fn cmyk_white_and_black() {
        let image = raw_image(vec![0, 0, 0, 0, 0, 0, 0, 255], 2, 1, ColorSpace::DeviceCmyk, 8);
        let rgb = decode(&image).unwrap().to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(rgb.get_pixel(1, 0).0, [0, 0, 0]);
    }

    #[test]
    fn indexed_samples_use_palette() {
        let space = ColorSpace::Indexed {
            base: Box::new(ColorSpace::DeviceRgb),
            hival: 1,
            lookup: vec![10, 20, 30, 200, 210, 220],
        };
        // 4-bit indices 1, 0.
        let image = raw_image(vec![0x10], 2, 1, space, 4);
        let rgb = decode(&image).unwrap().to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [200, 210, 220]);
        assert_eq!(rgb.get_pixel(1, 0).0, [10, 20, 30]);
    }

    #[test]
    fn short_palette_is_a_format_error() {
        let space = ColorSpace::Indexed {
            base: Box::new(ColorSpace::DeviceRgb),
            hival: 3,
            lookup: vec![0; 6],
        };
        let image = raw_image(vec![0], 1, 1, space, 8);
        assert!(matches!(decode(&image), Err(RxPdfError::Format { .. })));
    }

    #[test]
    fn truncated_samples_are_a_format_error() {
        let image = raw_image(vec![0; 5], 2, 1, ColorSpace::DeviceRgb, 8);
        assert!(matches!(
            decode(&image),
            Err(RxPdfError::Format {
                location: FormatLocation::Page(0),
                ..
            })
        ));
    }

    #[test]
    fn unknown_colour_space_is_unsupported() {
        let lab = ColorSpace::from_object(&Object::Name(b"Lab".to_vec()));
        let image = raw_image(vec![0; 3], 1, 1, lab, 8);
        assert!(matches!(
            decode(&image),
            Err(RxPdfError::UnsupportedColorSpace(_))
        ));
    }

    #[test]
    fn sixteen_bit_rgb_is_unsupported() {
        let image = raw_image(vec![0; 6], 1, 1, ColorSpace::DeviceRgb, 16);
        assert!(matches!(
            decode(&image),
            Err(RxPdfError::UnsupportedColorSpace(_))
        ));
    }

    #[test]
    fn jpeg2000_filter_is_unsupported() {
        let image = ImageResource::new(
            "Im0",
            ObjectKey(1),
            vec![0; 16],
            4,
            4,
            PixelFormat::rgb8(),
            vec![b"JPXDecode".to_vec()],
        );
        assert!(matches!(
            decode(&image),
            Err(RxPdfError::UnsupportedColorSpace(_))
        ));
    }
}
