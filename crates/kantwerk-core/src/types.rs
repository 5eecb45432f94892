// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Kantwerk document detection.

use serde::{Deserialize, Serialize};

/// A point in image (pixel) space or normalized space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Four corners with fixed positional roles.
///
/// Produced by the corner orderer from an unordered quadrilateral. The roles
/// are assigned by a sum/difference heuristic, so for strongly rotated or
/// degenerate input two roles may share a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderedCorners {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl OrderedCorners {
    /// The corners of a `width` x `height` image.
    pub fn full_image(width: u32, height: u32) -> Self {
        let (w, h) = (f64::from(width), f64::from(height));
        Self {
            top_left: Point::new(0.0, 0.0),
            top_right: Point::new(w, 0.0),
            bottom_right: Point::new(w, h),
            bottom_left: Point::new(0.0, h),
        }
    }

    /// Corners in clockwise order starting top-left: `[tl, tr, br, bl]`.
    pub fn to_array(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }
}

/// C-compatible coordinate pair.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Normalized document corners handed back to the host application.
///
/// Field order (`top_left`, `top_right`, `bottom_left`, `bottom_right`) is the
/// wire layout expected by existing hosts and differs from the clockwise order
/// used internally. Returned by value; there is nothing for the caller to free.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub top_left: Coordinate,
    pub top_right: Coordinate,
    pub bottom_left: Coordinate,
    pub bottom_right: Coordinate,
}

impl DetectionResult {
    /// The trivial result for empty or unreadable input: the unit square.
    pub const fn unit_square() -> Self {
        Self {
            top_left: Coordinate::new(0.0, 0.0),
            top_right: Coordinate::new(1.0, 0.0),
            bottom_left: Coordinate::new(0.0, 1.0),
            bottom_right: Coordinate::new(1.0, 1.0),
        }
    }

    /// Normalize pixel-space corners by the image dimensions.
    ///
    /// Returns the unit square when either dimension is zero.
    pub fn normalized(corners: &OrderedCorners, width: u32, height: u32) -> Self {
        if width == 0 || height == 0 {
            return Self::unit_square();
        }
        let (w, h) = (f64::from(width), f64::from(height));
        let norm = |p: Point| Coordinate::new(p.x / w, p.y / h);
        Self {
            top_left: norm(corners.top_left),
            top_right: norm(corners.top_right),
            bottom_left: norm(corners.bottom_left),
            bottom_right: norm(corners.bottom_right),
        }
    }

    /// Coordinates in wire order: `[tl, tr, bl, br]`.
    pub fn coordinates(&self) -> [Coordinate; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }

    /// Whether every coordinate lies within `[0, 1]`.
    pub fn is_within_unit_square(&self) -> bool {
        self.coordinates()
            .iter()
            .all(|c| (0.0..=1.0).contains(&c.x) && (0.0..=1.0).contains(&c.y))
    }
}

impl Default for DetectionResult {
    fn default() -> Self {
        Self::unit_square()
    }
}
