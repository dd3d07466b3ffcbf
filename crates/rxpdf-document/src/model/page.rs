// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// A single page: rotation, boxes, resources, images and content bytes.

use std::collections::BTreeSet;

use lopdf::content::Content;
use lopdf::{Dictionary, Object};
use rxpdf_core::Rotation;

use super::ImageResource;

/// Page attributes carried through unchanged.
pub(crate) const BOX_KEYS: &[&[u8]] = &[
    b"MediaBox",
    b"CropBox",
    b"BleedBox",
    b"TrimBox",
    b"ArtBox",
    b"UserUnit",
];

/// Page keys the model stores in dedicated fields; everything else on the page
/// dictionary is carried in [`Page::attributes`].
pub(crate) const MODELLED_PAGE_KEYS: &[&[u8]] = &[
    b"Type",
    b"Parent",
    b"Resources",
    b"Contents",
    b"Rotate",
];

/// US Letter, used when neither the page nor its ancestors declare a MediaBox.
pub(crate) const DEFAULT_MEDIA_BOX: [i64; 4] = [0, 0, 612, 792];

/// One page of a [`super::Document`].
///
/// The content stream is kept as opaque decoded bytes. `resources` holds every
/// non-image resource as a self-contained object tree (nested streams inline),
/// while raster images live in `images`. `attributes` keeps the remaining
/// page entries (`/Annots`, `/Group`, `/Tabs`, ...) in the same form.
#[derive(Debug, Clone)]
pub struct Page {
    rotation: Rotation,
    boxes: Dictionary,
    resources: Dictionary,
    images: Vec<ImageResource>,
    content: Vec<u8>,
    attributes: Dictionary,
}

impl Page {
    /// An empty page with the given MediaBox size in points.
    pub fn new(width: u32, height: u32) -> Self {
        let mut boxes = Dictionary::new();
        boxes.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(i64::from(width)),
                Object::Integer(i64::from(height)),
            ]),
        );
        Self {
            rotation: Rotation::NONE,
            boxes,
            resources: Dictionary::new(),
            images: Vec::new(),
            content: Vec::new(),
            attributes: Dictionary::new(),
        }
    }

    pub(crate) fn from_parts(
        rotation: Rotation,
        boxes: Dictionary,
        resources: Dictionary,
        images: Vec<ImageResource>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            rotation,
            boxes,
            resources,
            images,
            content,
            attributes: Dictionary::new(),
        }
    }

    /// Attach the page entries the model does not interpret.
    pub fn with_attributes(mut self, attributes: Dictionary) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_content(mut self, content: Vec<u8>) -> Self {
        self.content = content;
        self
    }

    pub fn with_image(mut self, image: ImageResource) -> Self {
        self.images.push(image);
        self
    }

    // -- Accessors ------------------------------------------------------------

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn boxes(&self) -> &Dictionary {
        &self.boxes
    }

    pub fn resources(&self) -> &Dictionary {
        &self.resources
    }

    pub fn images(&self) -> &[ImageResource] {
        &self.images
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn attributes(&self) -> &Dictionary {
        &self.attributes
    }

    /// Annotation dictionaries listed under `/Annots`.
    pub fn annotations(&self) -> Vec<&Dictionary> {
        match self.attributes.get(b"Annots") {
            Ok(Object::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_dict().ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub(crate) fn resources_mut(&mut self) -> &mut Dictionary {
        &mut self.resources
    }

    pub(crate) fn images_mut(&mut self) -> &mut [ImageResource] {
        &mut self.images
    }

    pub(crate) fn retain_images(&mut self, keep: impl FnMut(&ImageResource) -> bool) {
        self.images.retain(keep);
    }

    /// MediaBox `[llx lly urx ury]` in points.
    pub fn media_box(&self) -> [f64; 4] {
        let values = match self.boxes.get(b"MediaBox") {
            Ok(Object::Array(items)) if items.len() == 4 => {
                items.iter().map(number).collect::<Option<Vec<f64>>>()
            }
            _ => None,
        };
        match values {
            Some(values) => [values[0], values[1], values[2], values[3]],
            None => DEFAULT_MEDIA_BOX.map(|v| v as f64),
        }
    }

    /// Width and height of the MediaBox in points, ignoring rotation.
    pub fn size(&self) -> (f64, f64) {
        let [llx, lly, urx, ury] = self.media_box();
        ((urx - llx).abs(), (ury - lly).abs())
    }

    /// Names the content stream paints with `Do`.
    ///
    /// `None` when the content cannot be tokenised.
    pub fn invoked_xobjects(&self) -> Option<BTreeSet<Vec<u8>>> {
        let content = Content::decode(&self.content).ok()?;
        Some(
            content
                .operations
                .iter()
                .filter(|op| op.operator == "Do")
                .filter_map(|op| match op.operands.first() {
                    Some(Object::Name(name)) => Some(name.clone()),
                    _ => None,
                })
                .collect(),
        )
    }

    /// Image names present in the resource table but never painted.
    pub fn unused_images(&self) -> Vec<Vec<u8>> {
        match self.invoked_xobjects() {
            Some(invoked) => self
                .images
                .iter()
                .filter(|image| !invoked.contains(image.name()))
                .map(|image| image.name().to_vec())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Names painted with `Do` that neither an image nor another XObject defines.
    pub fn missing_xobjects(&self) -> Vec<Vec<u8>> {
        let Some(invoked) = self.invoked_xobjects() else {
            return Vec::new();
        };
        let forms = match self.resources.get(b"XObject") {
            Ok(Object::Dictionary(dict)) => Some(dict),
            _ => None,
        };
        invoked
            .into_iter()
            .filter(|name| {
                !self.images.iter().any(|image| image.name() == name.as_slice())
                    && !forms.is_some_and(|forms| forms.has(name))
            })
            .collect()
    }
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ObjectKey, PixelFormat};

    fn image(name: &str) -> ImageResource {
        ImageResource::new(
            name,
            ObjectKey(1),
            vec![0; 3],
            1,
            1,
            PixelFormat::rgb8(),
            Vec::new(),
        )
    }

    #[test]
    fn new_page_has_integer_media_box() {
        let page = Page::new(640, 480);
        assert_eq!(page.size(), (640.0, 480.0));
        assert_eq!(page.rotation(), Rotation::NONE);
    }

    #[test]
    fn annotations_come_from_attributes() {
        let mut link = Dictionary::new();
        link.set("Subtype", Object::Name(b"Link".to_vec()));
        let mut attributes = Dictionary::new();
        attributes.set("Annots", Object::Array(vec![Object::Dictionary(link), Object::Null]));
        let page = Page::new(100, 100).with_attributes(attributes);

        let annotations = page.annotations();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].get(b"Subtype").unwrap().as_name().unwrap(), b"Link");
        assert!(Page::new(1, 1).annotations().is_empty());
    }

    #[test]
    fn invoked_xobjects_reads_do_operators() {
        let page = Page::new(100, 100)
            .with_content(b"q 10 0 0 10 0 0 cm /Im0 Do Q /Fm1 Do".to_vec());
        let invoked = page.invoked_xobjects().unwrap();
        assert!(invoked.contains(b"Im0".as_slice()));
        assert!(invoked.contains(b"Fm1".as_slice()));
    }

    #[test]
    fn unused_and_missing_names_are_reported() {
        let page = Page::new(100, 100)
            .with_content(b"/Im0 Do /Im9 Do".to_vec())
            .with_image(image("Im0"))
            .with_image(image("Im1"));
        assert_eq!(page.unused_images(), vec![b"Im1".to_vec()]);
        assert_eq!(page.missing_xobjects(), vec![b"Im9".to_vec()]);
    }
}
