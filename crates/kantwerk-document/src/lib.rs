// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// kantwerk-document: Document detection for the Kantwerk scanner.
//
// Provides image handling (load, raw-buffer wrapping, rotate, grayscale, median
// blur, binarization, save) and the detection pipeline (preprocessing,
// multi-threshold quadrilateral search, scoring, corner ordering, perspective
// rectification).

pub mod image;
pub mod scan;

// Re-export the primary structs so callers can use `kantwerk_document::DocumentDetector` etc.
pub use image::processor::ImageProcessor;
pub use scan::detector::{Detection, DocumentDetector};
pub use scan::rectify::PerspectiveTransform;
