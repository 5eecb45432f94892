// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Multi-threshold quadrilateral search. Every Canny threshold gets its own
// edge map, contour trace and polygon approximation; convex, roughly
// rectangular four-gons from all passes are pooled.

use image::GrayImage;
use imageproc::contours::find_contours;
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::morphology::dilate;
use imageproc::point::Point;
use kantwerk_core::config::CandidateConfig;
use tracing::{debug, instrument};

use super::geometry::{
    approximate_closed_polygon, closed_perimeter, is_convex, max_corner_cosine, shoelace_area,
};

/// A convex four-point polygon found in one edge-detection pass.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadCandidate {
    /// Vertices in contour order.
    pub points: [Point<i32>; 4],
    /// Enclosed area in px².
    pub area: f64,
    /// Largest `|cos|` of the four corner angles.
    pub max_cosine: f64,
    /// Canny low threshold of the pass that produced this candidate.
    pub threshold: f32,
}

/// Run every threshold pass over the smoothed image and pool the survivors in
/// threshold order. Duplicates across passes are kept.
#[instrument(skip_all, fields(passes = config.canny_thresholds.len()))]
pub fn extract_candidates(smoothed: &GrayImage, config: &CandidateConfig) -> Vec<QuadCandidate> {
    let mut pool = Vec::new();
    for &threshold in &config.canny_thresholds {
        let found = candidates_at_threshold(smoothed, threshold, config);
        debug!(threshold, count = found.len(), "Threshold pass complete");
        pool.extend(found);
    }
    debug!(total = pool.len(), "Candidate pool assembled");
    pool
}

/// One pass: Canny, edge dilation, contour trace, polygon filter.
pub fn candidates_at_threshold(
    smoothed: &GrayImage,
    threshold: f32,
    config: &CandidateConfig,
) -> Vec<QuadCandidate> {
    let edges = canny(smoothed, threshold, threshold * config.high_ratio);
    let edges = dilate_edges(&edges, config.edge_dilation_radius);

    find_contours::<i32>(&edges)
        .into_iter()
        .filter_map(|contour| quad_from_contour(&contour.points, threshold, config))
        .collect()
}

/// Grow every edge pixel into a disk of the given radius, closing small gaps
/// between edge fragments.
pub fn dilate_edges(edges: &GrayImage, radius: u8) -> GrayImage {
    if radius == 0 {
        return edges.clone();
    }
    dilate(edges, Norm::L2, radius)
}

/// Approximate a traced contour and keep it only if it is a large, convex,
/// near-rectangular quadrilateral.
pub fn quad_from_contour(
    contour: &[Point<i32>],
    threshold: f32,
    config: &CandidateConfig,
) -> Option<QuadCandidate> {
    if contour.len() < 4 {
        return None;
    }

    let epsilon = closed_perimeter(contour) * config.approx_epsilon_ratio;
    if epsilon <= 0.0 {
        return None;
    }
    let approx = approximate_closed_polygon(contour, epsilon);
    let points: [Point<i32>; 4] = approx.as_slice().try_into().ok()?;

    let area = shoelace_area(&points);
    if area <= config.min_area || !is_convex(&points) {
        return None;
    }

    let max_cosine = max_corner_cosine(&points);
    if max_cosine >= config.max_corner_cosine {
        return None;
    }

    Some(QuadCandidate {
        points,
        area,
        max_cosine,
        threshold,
    })
}
