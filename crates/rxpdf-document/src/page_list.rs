// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page list parsing — "2,4,6" removal lists, "1:90,3:270" rotation lists and
// "3,1,2" orderings. Callers type 1-based page numbers; everything returned
// here is 0-based.
//
// The lenient parsers drop malformed tokens and keep the rest. The strict
// parsers reject the input and name every malformed token.

use std::collections::{BTreeMap, BTreeSet};

use rxpdf_core::Rotation;
use rxpdf_core::error::{Result, RxPdfError};
use tracing::debug;

/// Per-page rotation deltas, keyed by 0-based page index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationMap(BTreeMap<usize, Rotation>);

impl RotationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a delta for `index`. Repeated entries for one page accumulate.
    pub fn add(&mut self, index: usize, delta: Rotation) {
        let entry = self.0.entry(index).or_insert(Rotation::NONE);
        *entry = entry.then(delta);
    }

    pub fn get(&self, index: usize) -> Option<Rotation> {
        self.0.get(&index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Rotation)> + '_ {
        self.0.iter().map(|(index, rotation)| (*index, *rotation))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(usize, Rotation)> for RotationMap {
    fn from_iter<I: IntoIterator<Item = (usize, Rotation)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (index, delta) in iter {
            map.add(index, delta);
        }
        map
    }
}

/// 0-based page indices to remove.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalSet(BTreeSet<usize>);

impl RemovalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: usize) -> bool {
        self.0.insert(index)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// How many entries address a page of a `page_count`-page document.
    pub fn in_range(&self, page_count: usize) -> usize {
        self.0.range(..page_count).count()
    }
}

impl FromIterator<usize> for RemovalSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// -- Parsers ------------------------------------------------------------------

/// Parse `"1:90,3:270"`, silently dropping malformed tokens.
pub fn parse_rotation_spec(text: &str) -> RotationMap {
    let (map, rejected) = split_tokens(text, rotation_token);
    log_rejected("rotation", &rejected);
    map.into_iter().collect()
}

/// Parse `"1:90,3:270"`, failing with every malformed token.
pub fn parse_rotation_spec_strict(text: &str) -> Result<RotationMap> {
    let (map, rejected) = split_tokens(text, rotation_token);
    reject(rejected)?;
    Ok(map.into_iter().collect())
}

/// Parse `"2,4,6"`, silently dropping malformed tokens.
pub fn parse_removal_spec(text: &str) -> RemovalSet {
    let (pages, rejected) = split_tokens(text, page_index);
    log_rejected("removal", &rejected);
    pages.into_iter().collect()
}

/// Parse `"2,4,6"`, failing with every malformed token.
pub fn parse_removal_spec_strict(text: &str) -> Result<RemovalSet> {
    let (pages, rejected) = split_tokens(text, page_index);
    reject(rejected)?;
    Ok(pages.into_iter().collect())
}

/// Parse a full ordering such as `"3,1,2"` into 0-based indices. Always strict.
pub fn parse_page_order(text: &str) -> Result<Vec<usize>> {
    let (order, rejected) = split_tokens(text, page_index);
    reject(rejected)?;
    Ok(order)
}

/// Split on commas, trim, skip empty tokens and sort into parsed / rejected.
fn split_tokens<T>(text: &str, parse: fn(&str) -> Option<T>) -> (Vec<T>, Vec<String>) {
    let mut parsed = Vec::new();
    let mut rejected = Vec::new();
    for token in text.split(',').map(str::trim).filter(|token| !token.is_empty()) {
        match parse(token) {
            Some(value) => parsed.push(value),
            None => rejected.push(token.to_string()),
        }
    }
    (parsed, rejected)
}

/// A 1-based page number as a 0-based index. Page 0 is malformed.
fn page_index(token: &str) -> Option<usize> {
    token.parse::<usize>().ok()?.checked_sub(1)
}

fn rotation_token(token: &str) -> Option<(usize, Rotation)> {
    let (page, angle) = token.split_once(':')?;
    let index = page_index(page.trim())?;
    let rotation = Rotation::from_degrees(angle.trim().parse::<i64>().ok()?)?;
    Some((index, rotation))
}

fn reject(rejected: Vec<String>) -> Result<()> {
    if rejected.is_empty() {
        Ok(())
    } else {
        Err(RxPdfError::InvalidSpec { tokens: rejected })
    }
}

fn log_rejected(kind: &str, rejected: &[String]) {
    if !rejected.is_empty() {
        debug!(kind, ?rejected, "Dropped malformed page list tokens");
    }
}
