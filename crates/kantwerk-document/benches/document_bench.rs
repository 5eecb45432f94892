// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the kantwerk-document detection pipeline on
// synthetic pages.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, GrayImage, Luma};

use kantwerk_document::DocumentDetector;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Light page on a dark table, page inset by a fifth of each dimension.
fn synthetic_photo(width: u32, height: u32) -> DynamicImage {
    let (x0, y0) = (width / 5, height / 5);
    let (x1, y1) = (width - x0, height - y0);
    let img = GrayImage::from_fn(width, height, |x, y| {
        if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
            Luma([235u8])
        } else {
            Luma([25u8])
        }
    });
    DynamicImage::ImageLuma8(img)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Full corner detection: preprocessing, four Canny passes, contour search and
/// scoring.
fn bench_detect(c: &mut Criterion) {
    let detector = DocumentDetector::default();
    let photo = synthetic_photo(640, 480);

    c.bench_function("detect (640x480)", |b| {
        b.iter(|| black_box(detector.detect(black_box(&photo))));
    });
}

/// Detection followed by the perspective warp.
fn bench_detect_and_rectify(c: &mut Criterion) {
    let detector = DocumentDetector::default();
    let photo = synthetic_photo(640, 480);

    c.bench_function("detect + rectify (640x480)", |b| {
        b.iter(|| {
            let detection = detector.detect(black_box(&photo));
            black_box(detector.rectify(&photo, &detection).ok());
        });
    });
}

/// The degenerate fallback path: a blank frame with no edges at all.
fn bench_blank_frame(c: &mut Criterion) {
    let detector = DocumentDetector::default();
    let blank = DynamicImage::ImageLuma8(GrayImage::new(640, 480));

    c.bench_function("detect blank (640x480)", |b| {
        b.iter(|| black_box(detector.detect(black_box(&blank))));
    });
}

criterion_group!(benches, bench_detect, bench_detect_and_rectify, bench_blank_frame);
criterion_main!(benches);
