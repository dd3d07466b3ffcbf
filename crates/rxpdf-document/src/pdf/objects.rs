// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Object-graph helpers shared by the reader and writer.
//
// The reader flattens indirect references into self-contained trees so each
// page owns its resources outright; the writer hoists nested streams back into
// indirect objects, writing identical streams only once.

use std::collections::{BTreeSet, HashMap};

use lopdf::{Dictionary, Object, ObjectId, Stream};
use rxpdf_core::error::{FormatLocation, Result, RxPdfError};
use sha2::{Digest, Sha256};
use tracing::warn;

/// Maximum reference nesting followed before the graph is declared cyclic.
pub(crate) const MAX_DEPTH: usize = 64;

// -- Reading ------------------------------------------------------------------

/// Follow a single reference, returning the target (or the object itself).
pub(crate) fn deref<'a>(source: &'a lopdf::Document, object: &'a Object) -> Result<&'a Object> {
    match object {
        Object::Reference(id) => source.get_object(*id).map_err(|err| {
            RxPdfError::format(
                FormatLocation::Object(id.0, id.1),
                format!("unresolvable reference: {}", err),
            )
        }),
        other => Ok(other),
    }
}

/// Deep-copy `object`, replacing every reference with the object it points
/// at. `/Parent` back-links are dropped; dangling references become `null`.
pub(crate) fn resolve_tree(source: &lopdf::Document, object: &Object) -> Result<Object> {
    resolve_at_depth(source, object, 0, None, &BTreeSet::new())
}

/// As [`resolve_tree`] for a dictionary.
pub(crate) fn resolve_dictionary_tree(
    source: &lopdf::Document,
    dict: &Dictionary,
) -> Result<Dictionary> {
    resolve_dictionary(source, dict, 0, None, &BTreeSet::new())
}

/// As [`resolve_tree`], cutting every reference to an object in `detached`:
/// dictionary entries pointing there are dropped, array items become `null`.
///
/// Used for page attributes, whose annotations link back to page objects.
pub(crate) fn resolve_detached(
    source: &lopdf::Document,
    object: &Object,
    detached: &BTreeSet<ObjectId>,
) -> Result<Object> {
    resolve_at_depth(source, object, 0, None, detached)
}

fn resolve_at_depth(
    source: &lopdf::Document,
    object: &Object,
    depth: usize,
    via: Option<ObjectId>,
    detached: &BTreeSet<ObjectId>,
) -> Result<Object> {
    if depth > MAX_DEPTH {
        let location = via.map_or(FormatLocation::Document, |id| {
            FormatLocation::Object(id.0, id.1)
        });
        return Err(RxPdfError::format(
            location,
            "reference chain too deep (cyclic object graph?)",
        ));
    }

    match object {
        Object::Reference(id) if detached.contains(id) => Ok(Object::Null),
        Object::Reference(id) => match source.get_object(*id) {
            Ok(target) => resolve_at_depth(source, target, depth + 1, Some(*id), detached),
            Err(err) => {
                warn!(?id, %err, "Cannot resolve reference, using null");
                Ok(Object::Null)
            }
        },
        Object::Dictionary(dict) => Ok(Object::Dictionary(resolve_dictionary(
            source, dict, depth, via, detached,
        )?)),
        Object::Array(items) => items
            .iter()
            .map(|item| resolve_at_depth(source, item, depth + 1, via, detached))
            .collect::<Result<Vec<_>>>()
            .map(Object::Array),
        Object::Stream(stream) => {
            let dict = resolve_dictionary(source, &stream.dict, depth, via, detached)?;
            Ok(Object::Stream(Stream::new(dict, stream.content.clone())))
        }
        other => Ok(other.clone()),
    }
}

fn resolve_dictionary(
    source: &lopdf::Document,
    dict: &Dictionary,
    depth: usize,
    via: Option<ObjectId>,
    detached: &BTreeSet<ObjectId>,
) -> Result<Dictionary> {
    let mut resolved = Dictionary::new();
    for (key, value) in dict.iter() {
        if key == b"Parent" {
            continue;
        }
        if matches!(value, Object::Reference(id) if detached.contains(id)) {
            continue;
        }
        resolved.set(
            key.clone(),
            resolve_at_depth(source, value, depth + 1, via, detached)?,
        );
    }
    Ok(resolved)
}

/// Decoded bytes of a stream. Unfiltered streams are returned as-is.
pub(crate) fn decoded_content(stream: &Stream, location: FormatLocation) -> Result<Vec<u8>> {
    if stream.dict.get(b"Filter").is_err() {
        return Ok(stream.content.clone());
    }
    stream
        .decompressed_content()
        .map_err(|err| RxPdfError::format(location, format!("cannot decode stream: {}", err)))
}

/// Integer value of a resolved object, accepting reals with no fraction.
pub(crate) fn integer(object: &Object) -> Option<i64> {
    match object {
        Object::Integer(value) => Some(*value),
        Object::Real(value) if value.fract() == 0.0 => Some(*value as i64),
        _ => None,
    }
}

// -- Writing ------------------------------------------------------------------

/// Tracks streams already written to an output document, keyed by content.
#[derive(Default)]
pub(crate) struct StreamTable {
    written: HashMap<[u8; 32], ObjectId>,
}

impl StreamTable {
    /// Copy `object` into a form `output` can hold: every nested stream becomes
    /// an indirect object and the copy refers to it.
    pub(crate) fn hoist(&mut self, output: &mut lopdf::Document, object: &Object) -> Object {
        match object {
            Object::Stream(stream) => {
                let dict = self.hoist_dictionary(output, &stream.dict);
                let stream = Stream::new(dict, stream.content.clone());
                Object::Reference(self.write_stream(output, stream))
            }
            Object::Dictionary(dict) => Object::Dictionary(self.hoist_dictionary(output, dict)),
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.hoist(output, item))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    pub(crate) fn hoist_dictionary(
        &mut self,
        output: &mut lopdf::Document,
        dict: &Dictionary,
    ) -> Dictionary {
        let mut hoisted = Dictionary::new();
        for (key, value) in dict.iter() {
            hoisted.set(key.clone(), self.hoist(output, value));
        }
        hoisted
    }

    /// Add `stream` unless an identical one was written already.
    fn write_stream(&mut self, output: &mut lopdf::Document, stream: Stream) -> ObjectId {
        let digest = stream_digest(&stream);
        if let Some(id) = self.written.get(&digest) {
            return *id;
        }
        let id = output.add_object(Object::Stream(stream));
        self.written.insert(digest, id);
        id
    }
}

/// SHA-256 over a canonical encoding of a stream (dictionary and bytes).
pub(crate) fn stream_digest(stream: &Stream) -> [u8; 32] {
    let mut hasher = Sha256::new();
    feed_dictionary(&mut hasher, &stream.dict);
    feed_bytes(&mut hasher, b'S', &stream.content);
    hasher.finalize().into()
}

fn feed_bytes(hasher: &mut Sha256, tag: u8, bytes: &[u8]) {
    hasher.update([tag]);
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}

fn feed_dictionary(hasher: &mut Sha256, dict: &Dictionary) {
    hasher.update([b'<']);
    hasher.update((dict.len() as u64).to_be_bytes());
    for (key, value) in dict.iter() {
        // Length follows from the content, which is hashed separately.
        if key == b"Length" {
            continue;
        }
        feed_bytes(hasher, b'/', key);
        feed_object(hasher, value);
    }
}

fn feed_object(hasher: &mut Sha256, object: &Object) {
    match object {
        Object::Null => hasher.update([b'n']),
        Object::Boolean(value) => hasher.update([b'b', u8::from(*value)]),
        Object::Integer(value) => {
            hasher.update([b'i']);
            hasher.update(value.to_be_bytes());
        }
        Object::Real(value) => {
            hasher.update([b'r']);
            hasher.update(value.to_be_bytes());
        }
        Object::Name(name) => feed_bytes(hasher, b'N', name),
        Object::String(bytes, _) => feed_bytes(hasher, b's', bytes),
        Object::Array(items) => {
            hasher.update([b'[']);
            hasher.update((items.len() as u64).to_be_bytes());
            for item in items {
                feed_object(hasher, item);
            }
        }
        Object::Dictionary(dict) => feed_dictionary(hasher, dict),
        Object::Stream(stream) => {
            feed_dictionary(hasher, &stream.dict);
            feed_bytes(hasher, b'S', &stream.content);
        }
        Object::Reference((number, generation)) => {
            hasher.update([b'R']);
            hasher.update(number.to_be_bytes());
            hasher.update(generation.to_be_bytes());
        }
    }
}
