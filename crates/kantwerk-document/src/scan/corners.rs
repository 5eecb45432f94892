// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner role assignment by coordinate sum and difference.

use kantwerk_core::{OrderedCorners, Point};

/// Assign corner roles to four points.
///
/// The top-left corner has the smallest `x + y`, bottom-right the largest;
/// top-right has the smallest `y - x`, bottom-left the largest. Ties go to the
/// earliest point. On strongly rotated quads two roles can land on the same
/// point; that is not corrected here.
pub fn order_corners(points: &[Point; 4]) -> OrderedCorners {
    let sums = points.map(|p| p.x + p.y);
    let diffs = points.map(|p| p.y - p.x);

    OrderedCorners {
        top_left: points[arg_min(&sums)],
        top_right: points[arg_min(&diffs)],
        bottom_right: points[arg_max(&sums)],
        bottom_left: points[arg_max(&diffs)],
    }
}

fn arg_min(values: &[f64; 4]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v < values[best] {
            best = i;
        }
    }
    best
}

fn arg_max(values: &[f64; 4]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: [(f64, f64); 4]) -> [Point; 4] {
        raw.map(Point::from)
    }

    #[test]
    fn shuffled_rectangle_is_ordered() {
        let corners = order_corners(&pts([(90.0, 80.0), (10.0, 80.0), (90.0, 10.0), (10.0, 10.0)]));
        assert_eq!(corners.top_left, Point::new(10.0, 10.0));
        assert_eq!(corners.top_right, Point::new(90.0, 10.0));
        assert_eq!(corners.bottom_right, Point::new(90.0, 80.0));
        assert_eq!(corners.bottom_left, Point::new(10.0, 80.0));
    }

    #[test]
    fn ordering_is_idempotent() {
        let input = pts([(12.0, 40.0), (200.0, 18.0), (215.0, 160.0), (5.0, 170.0)]);
        let once = order_corners(&input);
        let twice = order_corners(&once.to_array());
        assert_eq!(once, twice);
    }

    #[test]
    fn ties_resolve_to_first_point() {
        // A 45°-rotated square: two points share the minimal y - x.
        let input = pts([(50.0, 0.0), (100.0, 50.0), (50.0, 100.0), (0.0, 50.0)]);
        let corners = order_corners(&input);
        assert_eq!(corners.top_right, Point::new(50.0, 0.0));
    }
}
