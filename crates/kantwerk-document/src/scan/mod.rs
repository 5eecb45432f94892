// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline: preprocessing, multi-threshold quadrilateral search,
// candidate scoring, corner ordering and perspective rectification.

pub mod candidates;
pub mod corners;
pub mod detector;
pub mod geometry;
pub mod preprocess;
pub mod rectify;
pub mod scoring;

pub use candidates::QuadCandidate;
pub use corners::order_corners;
pub use detector::{Detection, DocumentDetector};
pub use rectify::PerspectiveTransform;
pub use scoring::ScoredQuad;
