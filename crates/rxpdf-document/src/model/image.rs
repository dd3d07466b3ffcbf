// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Embedded raster images and their declared pixel formats.

use lopdf::{Dictionary, Object, Stream, StringFormat};
use rxpdf_core::error::{FormatLocation, Result, RxPdfError};

use super::ObjectKey;
use crate::pdf::objects;

/// Colour space declared by an image dictionary.
#[derive(Debug, Clone)]
pub enum ColorSpace {
    DeviceRgb,
    DeviceGray,
    DeviceCmyk,
    /// ICC profile stream with `components` channels (`/N`).
    IccBased { components: u8, profile: Object },
    /// Palette of `hival + 1` entries in `base`.
    Indexed {
        base: Box<ColorSpace>,
        hival: u8,
        lookup: Vec<u8>,
    },
    /// Anything else (Lab, Separation, DeviceN, CalRGB, ...), kept verbatim.
    Other(Object),
}

impl ColorSpace {
    /// Number of colour channels per sample, when known.
    pub fn components(&self) -> Option<u8> {
        match self {
            Self::DeviceRgb => Some(3),
            Self::DeviceGray => Some(1),
            Self::DeviceCmyk => Some(4),
            Self::IccBased { components, .. } => Some(*components),
            Self::Indexed { .. } => Some(1),
            Self::Other(_) => None,
        }
    }

    /// Short name used in logs and summaries.
    pub fn name(&self) -> String {
        match self {
            Self::DeviceRgb => "DeviceRGB".into(),
            Self::DeviceGray => "DeviceGray".into(),
            Self::DeviceCmyk => "DeviceCMYK".into(),
            Self::IccBased { components, .. } => format!("ICCBased({components})"),
            Self::Indexed { base, .. } => format!("Indexed({})", base.name()),
            Self::Other(Object::Name(name)) => String::from_utf8_lossy(name).into_owned(),
            Self::Other(Object::Array(items)) => match items.first() {
                Some(Object::Name(name)) => String::from_utf8_lossy(name).into_owned(),
                _ => "Unknown".into(),
            },
            Self::Other(_) => "Unknown".into(),
        }
    }

    /// Interpret a resolved `/ColorSpace` value.
    pub fn from_object(object: &Object) -> Self {
        match object {
            Object::Name(name) => match name.as_slice() {
                b"DeviceRGB" | b"RGB" => Self::DeviceRgb,
                b"DeviceGray" | b"G" => Self::DeviceGray,
                b"DeviceCMYK" | b"CMYK" => Self::DeviceCmyk,
                _ => Self::Other(object.clone()),
            },
            Object::Array(items) => match items.as_slice() {
                [Object::Name(family), profile] if family == b"ICCBased" => {
                    match icc_components(profile) {
                        Some(components) => Self::IccBased {
                            components,
                            profile: profile.clone(),
                        },
                        None => Self::Other(object.clone()),
                    }
                }
                [Object::Name(family), base, Object::Integer(hival), lookup]
                    if family == b"Indexed" || family == b"I" =>
                {
                    let base = Self::from_object(base);
                    let lookup = match lookup {
                        Object::String(bytes, _) => Some(bytes.clone()),
                        Object::Stream(stream) => stream
                            .decompressed_content()
                            .ok()
                            .or_else(|| Some(stream.content.clone())),
                        _ => None,
                    };
                    match (lookup, u8::try_from(*hival)) {
                        (Some(lookup), Ok(hival)) if !matches!(base, Self::Indexed { .. }) => {
                            Self::Indexed {
                                base: Box::new(base),
                                hival,
                                lookup,
                            }
                        }
                        _ => Self::Other(object.clone()),
                    }
                }
                [Object::Name(name)] => Self::from_object(&Object::Name(name.clone())),
                _ => Self::Other(object.clone()),
            },
            _ => Self::Other(object.clone()),
        }
    }

    /// The `/ColorSpace` value written back into an image dictionary.
    pub fn to_object(&self) -> Object {
        match self {
            Self::DeviceRgb => Object::Name(b"DeviceRGB".to_vec()),
            Self::DeviceGray => Object::Name(b"DeviceGray".to_vec()),
            Self::DeviceCmyk => Object::Name(b"DeviceCMYK".to_vec()),
            Self::IccBased { profile, .. } => Object::Array(vec![
                Object::Name(b"ICCBased".to_vec()),
                profile.clone(),
            ]),
            Self::Indexed {
                base,
                hival,
                lookup,
            } => Object::Array(vec![
                Object::Name(b"Indexed".to_vec()),
                base.to_object(),
                Object::Integer(i64::from(*hival)),
                Object::String(lookup.clone(), StringFormat::Hexadecimal),
            ]),
            Self::Other(object) => object.clone(),
        }
    }
}

/// `/N` of an inline ICC profile stream.
fn icc_components(profile: &Object) -> Option<u8> {
    let Object::Stream(stream) = profile else {
        return None;
    };
    match stream.dict.get(b"N") {
        Ok(Object::Integer(n @ (1 | 3 | 4))) => Some(*n as u8),
        _ => None,
    }
}

/// Declared pixel layout of an image: colour space plus sample depth.
#[derive(Debug, Clone)]
pub struct PixelFormat {
    pub color_space: ColorSpace,
    pub bits_per_component: u8,
}

impl PixelFormat {
    /// The canonical format produced by recompression and assembly.
    pub fn rgb8() -> Self {
        Self {
            color_space: ColorSpace::DeviceRgb,
            bits_per_component: 8,
        }
    }
}

/// A raster image embedded in a page's resource table.
///
/// `name` is the page-local key the content stream uses (`/Im0 Do`); `key`
/// identifies the underlying image object across the whole document, so pages
/// that share one image also share its key.
#[derive(Debug, Clone)]
pub struct ImageResource {
    name: Vec<u8>,
    key: ObjectKey,
    data: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
    filters: Vec<Vec<u8>>,
    /// Remaining image dictionary entries (`SMask`, `DecodeParms`, `Interpolate`, ...).
    attributes: Dictionary,
}

/// Image dictionary keys the model stores in dedicated fields.
pub(crate) const MODELLED_IMAGE_KEYS: &[&[u8]] = &[
    b"Type",
    b"Subtype",
    b"Width",
    b"Height",
    b"ColorSpace",
    b"BitsPerComponent",
    b"Filter",
    b"Length",
];

/// True for a sampled image XObject; stencil masks (`/ImageMask true`) are not.
pub(crate) fn is_raster_image(dict: &Dictionary) -> bool {
    let is_image = matches!(dict.get(b"Subtype"), Ok(Object::Name(subtype)) if subtype == b"Image");
    let is_mask = matches!(dict.get(b"ImageMask"), Ok(Object::Boolean(true)));
    is_image && !is_mask
}

impl ImageResource {
    /// Lift an image XObject whose dictionary holds no references.
    ///
    /// Width and height must be positive integers; a missing
    /// `/BitsPerComponent` means 8.
    pub(crate) fn from_dictionary(
        name: impl Into<Vec<u8>>,
        key: ObjectKey,
        dict: &Dictionary,
        data: Vec<u8>,
        location: FormatLocation,
    ) -> Result<Self> {
        let dimension = |key: &[u8]| -> Result<u32> {
            dict.get(key)
                .ok()
                .and_then(objects::integer)
                .and_then(|value| u32::try_from(value).ok())
                .filter(|value| *value > 0)
                .ok_or_else(|| {
                    RxPdfError::format(
                        location,
                        format!("image /{} missing or invalid", String::from_utf8_lossy(key)),
                    )
                })
        };
        let width = dimension(b"Width")?;
        let height = dimension(b"Height")?;

        let bits_per_component = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(objects::integer)
            .and_then(|bits| u8::try_from(bits).ok())
            .unwrap_or(8);
        let color_space = match dict.get(b"ColorSpace") {
            Ok(value) => ColorSpace::from_object(value),
            // JPEG 2000 images may omit it; the codestream decides.
            Err(_) => ColorSpace::Other(Object::Null),
        };
        let filters = match dict.get(b"Filter") {
            Ok(Object::Name(filter)) => vec![filter.clone()],
            Ok(Object::Array(chain)) => chain
                .iter()
                .filter_map(|item| match item {
                    Object::Name(filter) => Some(filter.clone()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        let mut attributes = Dictionary::new();
        for (key, value) in dict.iter() {
            if !MODELLED_IMAGE_KEYS.contains(&key.as_slice()) {
                attributes.set(key.clone(), value.clone());
            }
        }

        Ok(Self::new(
            name,
            key,
            data,
            width,
            height,
            PixelFormat {
                color_space,
                bits_per_component,
            },
            filters,
        )
        .with_attributes(attributes))
    }

    pub fn new(
        name: impl Into<Vec<u8>>,
        key: ObjectKey,
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
        filters: Vec<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            key,
            data,
            width,
            height,
            format,
            filters,
            attributes: Dictionary::new(),
        }
    }

    /// Attach extra image dictionary entries.
    pub fn with_attributes(mut self, attributes: Dictionary) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }

    pub fn key(&self) -> ObjectKey {
        self.key
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> &PixelFormat {
        &self.format
    }

    /// Stream filter chain, in decoding order.
    pub fn filters(&self) -> &[Vec<u8>] {
        &self.filters
    }

    pub fn attributes(&self) -> &Dictionary {
        &self.attributes
    }

    pub(crate) fn set_key(&mut self, key: ObjectKey) {
        self.key = key;
    }

    /// Swap in re-encoded JPEG bytes. The name and key are untouched.
    pub(crate) fn replace_with_jpeg(&mut self, data: Vec<u8>, width: u32, height: u32) {
        self.data = data;
        self.width = width;
        self.height = height;
        self.format = PixelFormat::rgb8();
        self.filters = vec![b"DCTDecode".to_vec()];
        // Both describe the old encoding.
        self.attributes.remove(b"DecodeParms");
        self.attributes.remove(b"Decode");
        // A colour-key mask names old sample values; a lossy RGB re-encode
        // has neither the same channel count nor the same values.
        if matches!(self.attributes.get(b"Mask"), Ok(Object::Array(_))) {
            self.attributes.remove(b"Mask");
        }
    }

    /// Build the image XObject stream. Nested streams (soft masks, ICC
    /// profiles) stay inline; the serializer hoists them.
    pub fn to_stream(&self) -> Stream {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", Object::Integer(i64::from(self.width)));
        dict.set("Height", Object::Integer(i64::from(self.height)));
        dict.set("ColorSpace", self.format.color_space.to_object());
        dict.set(
            "BitsPerComponent",
            Object::Integer(i64::from(self.format.bits_per_component)),
        );
        for (key, value) in self.attributes.iter() {
            dict.set(key.clone(), value.clone());
        }
        // Length then Filter: the order `Stream::compress` leaves behind, so a
        // reloaded image serialises byte-for-byte the same.
        dict.set("Length", Object::Integer(self.data.len() as i64));
        match self.filters.as_slice() {
            [] => {}
            [single] => dict.set("Filter", Object::Name(single.clone())),
            chain => dict.set(
                "Filter",
                Object::Array(chain.iter().cloned().map(Object::Name).collect()),
            ),
        }
        Stream::new(dict, self.data.clone())
    }
}
