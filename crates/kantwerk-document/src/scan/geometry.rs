// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Polygon helpers for contour-space (integer) points: perimeter, shoelace
// area, closed-curve Douglas-Peucker approximation, convexity and corner
// angle cosines.

use imageproc::point::Point;

/// Perimeter of a closed polygon (the last vertex connects back to the first).
pub fn closed_perimeter(points: &[Point<i32>]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let n = points.len();
    (0..n)
        .map(|i| distance(points[i], points[(i + 1) % n]))
        .sum()
}

/// Area of a polygon using the shoelace formula. Vertices must be in order
/// (CW or CCW); the result is unsigned.
pub fn shoelace_area(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0f64;
    for i in 0..n {
        let j = (i + 1) % n;
        area += f64::from(points[i].x) * f64::from(points[j].y);
        area -= f64::from(points[j].x) * f64::from(points[i].y);
    }
    area.abs() / 2.0
}

/// Approximate a closed curve by a polygon whose vertices are a subset of the
/// curve's points, no point of the curve lying farther than `epsilon` from it.
///
/// The curve is split at two mutually distant points and each half is
/// simplified with Douglas-Peucker.
pub fn approximate_closed_polygon(curve: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let n = curve.len();
    if n < 3 {
        return curve.to_vec();
    }

    let a = farthest_from(curve, 0);
    let b = farthest_from(curve, a);
    let (start, end) = (a.min(b), a.max(b));
    if start == end {
        return vec![curve[start]];
    }

    let mut polygon = Vec::new();
    simplify_open(&curve[start..=end], epsilon, &mut polygon);

    let wrapped: Vec<Point<i32>> = curve[end..]
        .iter()
        .chain(curve[..=start].iter())
        .copied()
        .collect();
    simplify_open(&wrapped, epsilon, &mut polygon);

    polygon
}

/// Whether a simple polygon is convex: every turn has the same orientation.
///
/// Collinear vertices are tolerated; a polygon whose turns are all collinear
/// is not convex.
pub fn is_convex(points: &[Point<i32>]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }

    let mut positive = false;
    let mut negative = false;
    for i in 0..n {
        let p0 = points[i];
        let p1 = points[(i + 1) % n];
        let p2 = points[(i + 2) % n];
        let cross = i64::from(p1.x - p0.x) * i64::from(p2.y - p1.y)
            - i64::from(p1.y - p0.y) * i64::from(p2.x - p1.x);
        if cross > 0 {
            positive = true;
        } else if cross < 0 {
            negative = true;
        }
        if positive && negative {
            return false;
        }
    }
    positive || negative
}

/// Cosine of the angle at `vertex` between the edges to `a` and `b`.
pub fn corner_cosine(a: Point<i32>, b: Point<i32>, vertex: Point<i32>) -> f64 {
    let dx1 = f64::from(a.x - vertex.x);
    let dy1 = f64::from(a.y - vertex.y);
    let dx2 = f64::from(b.x - vertex.x);
    let dy2 = f64::from(b.y - vertex.y);
    (dx1 * dx2 + dy1 * dy2) / ((dx1 * dx1 + dy1 * dy1) * (dx2 * dx2 + dy2 * dy2) + 1e-10).sqrt()
}

/// Largest `|cos|` over every corner of the polygon.
pub fn max_corner_cosine(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 1.0;
    }
    (0..n)
        .map(|i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            corner_cosine(prev, next, points[i]).abs()
        })
        .fold(0.0, f64::max)
}

fn distance(a: Point<i32>, b: Point<i32>) -> f64 {
    let dx = f64::from(a.x - b.x);
    let dy = f64::from(a.y - b.y);
    (dx * dx + dy * dy).sqrt()
}

/// Index of the first point farthest from `curve[from]`.
fn farthest_from(curve: &[Point<i32>], from: usize) -> usize {
    let origin = curve[from];
    let mut best = from;
    let mut best_dist = 0i64;
    for (i, p) in curve.iter().enumerate() {
        let dx = i64::from(p.x - origin.x);
        let dy = i64::from(p.y - origin.y);
        let d = dx * dx + dy * dy;
        if d > best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Distance from `p` to the infinite line through `a` and `b` (or to `a` when
/// the two coincide).
fn line_distance(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    let dx = f64::from(b.x - a.x);
    let dy = f64::from(b.y - a.y);
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return distance(p, a);
    }
    (dy * f64::from(p.x - a.x) - dx * f64::from(p.y - a.y)).abs() / len
}

/// Douglas-Peucker over an open arc. Appends the retained points to `out`,
/// excluding the arc's final point (it starts the next arc).
fn simplify_open(arc: &[Point<i32>], epsilon: f64, out: &mut Vec<Point<i32>>) {
    if arc.len() < 2 {
        out.extend_from_slice(arc);
        return;
    }

    let last = arc.len() - 1;
    let mut keep = vec![false; arc.len()];
    keep[0] = true;

    let mut stack = vec![(0usize, last)];
    while let Some((first, end)) = stack.pop() {
        if end <= first + 1 {
            continue;
        }
        let mut max_dist = 0.0;
        let mut index = first;
        for i in first + 1..end {
            let d = line_distance(arc[i], arc[first], arc[end]);
            if d > max_dist {
                max_dist = d;
                index = i;
            }
        }
        if max_dist > epsilon {
            keep[index] = true;
            stack.push((index, end));
            stack.push((first, index));
        }
    }

    out.extend(
        arc[..last]
            .iter()
            .zip(&keep[..last])
            .filter(|(_, kept)| **kept)
            .map(|(p, _)| *p),
    );
}
