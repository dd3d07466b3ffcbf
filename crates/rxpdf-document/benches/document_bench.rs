// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the rxpdf-document crate: image recompression and
// a load/serialise round trip on a synthetic document.

use std::io::Cursor;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use rxpdf_core::CompressOptions;
use rxpdf_document::{assemble, load, recompress, serialize};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A 4-page PDF, one 400x300 gradient photo per page.
fn synthetic_pdf() -> Vec<u8> {
    let photo = RgbImage::from_fn(400, 300, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut png = Vec::new();
    DynamicImage::ImageRgb8(photo)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .expect("benchmark PNG encodes");

    let images = vec![png; 4];
    let document = assemble(&images, 90).expect("benchmark document assembles");
    serialize(&document).expect("benchmark document serialises")
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Recompress every image at half resolution, quality 50.
fn bench_recompress(c: &mut Criterion) {
    let pdf = synthetic_pdf();
    let options = CompressOptions {
        dpi: 36,
        quality: 50,
        only_if_smaller: false,
    };

    c.bench_function("recompress (4 pages, 400x300, 36 dpi)", |b| {
        b.iter(|| {
            let document = load(black_box(&pdf)).expect("loads");
            let document = recompress(document, &options).expect("recompresses");
            black_box(serialize(&document).expect("serialises"));
        });
    });
}

/// Load and serialise without changes.
fn bench_round_trip(c: &mut Criterion) {
    let pdf = synthetic_pdf();

    c.bench_function("load + serialize (4 pages)", |b| {
        b.iter(|| {
            let document = load(black_box(&pdf)).expect("loads");
            black_box(serialize(&document).expect("serialises"));
        });
    });
}

criterion_group!(benches, bench_recompress, bench_round_trip);
criterion_main!(benches);
