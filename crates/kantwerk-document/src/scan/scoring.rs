// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Candidate filter and scorer: drops quadrilaterals that are too small or span
// (nearly) the whole frame, then picks the largest bounding extent.

use imageproc::point::Point;
use kantwerk_core::config::ScoringConfig;
use tracing::debug;

use super::candidates::QuadCandidate;

/// The winning candidate and the extent it was scored on.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredQuad {
    /// Points in positional order: top pair left to right, then bottom pair
    /// left to right.
    pub points: [Point<i32>; 4],
    pub width: f64,
    pub height: f64,
}

impl ScoredQuad {
    pub fn score(&self) -> f64 {
        self.width * self.height
    }
}

/// Sort by y, then each horizontal pair by x. Both sorts are stable.
pub fn positional_order(points: &[Point<i32>; 4]) -> [Point<i32>; 4] {
    let mut sorted = *points;
    sorted.sort_by_key(|p| p.y);
    sorted[..2].sort_by_key(|p| p.x);
    sorted[2..].sort_by_key(|p| p.x);
    sorted
}

/// Width and height of a positionally ordered quad, measured across both
/// diagonals of the `[TL, TR, BL, BR]` layout.
pub fn extent(ordered: &[Point<i32>; 4]) -> (f64, f64) {
    let [tl, tr, bl, br] = *ordered;
    let width = f64::from((br.x - tl.x).abs()).max(f64::from((tr.x - bl.x).abs()));
    let height = f64::from((br.y - tl.y).abs()).max(f64::from((tr.y - bl.y).abs()));
    (width, height)
}

/// Pick the best candidate for an image of the given size.
///
/// Returns `None` when every candidate is rejected; the first of several
/// equal-scoring candidates wins.
pub fn select_best(
    candidates: &[QuadCandidate],
    image_width: u32,
    image_height: u32,
    config: &ScoringConfig,
) -> Option<ScoredQuad> {
    let min_width = f64::from(image_width / config.min_width_divisor.max(1));
    let min_height = f64::from(image_height / config.min_height_divisor.max(1));
    let max_width = config.max_extent_ratio * f64::from(image_width);
    let max_height = config.max_extent_ratio * f64::from(image_height);

    let mut best: Option<ScoredQuad> = None;
    for candidate in candidates {
        let Some(scored) = score_points(&candidate.points) else {
            continue;
        };

        if scored.width < min_width || scored.height < min_height {
            debug!(width = scored.width, height = scored.height, "Candidate too small");
            continue;
        }
        if scored.width > max_width || scored.height > max_height {
            debug!(width = scored.width, height = scored.height, "Candidate spans the frame");
            continue;
        }

        if best.as_ref().is_none_or(|b| scored.score() > b.score()) {
            best = Some(scored);
        }
    }
    best
}

/// Order and measure a candidate's vertices; anything but four points is
/// refused.
fn score_points(points: &[Point<i32>]) -> Option<ScoredQuad> {
    let quad: &[Point<i32>; 4] = points.try_into().ok()?;
    let ordered = positional_order(quad);
    let (width, height) = extent(&ordered);
    Some(ScoredQuad {
        points: ordered,
        width,
        height,
    })
}
