// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification: four-point projective transform and a bilinear warp
// of the quadrilateral onto an axis-aligned rectangle.

use image::{DynamicImage, GrayImage, GrayAlphaImage, Luma, LumaA, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use kantwerk_core::error::{KantwerkError, Result};
use kantwerk_core::{OrderedCorners, Point};
use tracing::{debug, info, instrument};

/// Quads enclosing less than this many px² cannot be rectified.
const MIN_QUAD_AREA: f64 = 1.0;

/// Projective mapping of one quadrilateral onto another.
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveTransform {
    projection: Projection,
}

impl PerspectiveTransform {
    /// Solve for the transform mapping each `from[i]` onto `to[i]`.
    ///
    /// Collapsed quads on either side, or correspondences with no projective
    /// solution, are `DegenerateQuadrilateral`.
    pub fn from_correspondences(from: &[Point; 4], to: &[Point; 4]) -> Result<Self> {
        for (side, quad) in [("source", from), ("target", to)] {
            let area = quad_area(quad);
            if area < MIN_QUAD_AREA {
                return Err(KantwerkError::DegenerateQuadrilateral(format!(
                    "{} quadrilateral area {:.2} px² is too small",
                    side, area
                )));
            }
        }

        let as_f32 = |quad: &[Point; 4]| quad.map(|p| (p.x as f32, p.y as f32));
        let projection = Projection::from_control_points(as_f32(from), as_f32(to)).ok_or_else(
            || KantwerkError::DegenerateQuadrilateral("no projective transform fits".into()),
        )?;
        Ok(Self { projection })
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Map a point through the transform.
    pub fn apply(&self, p: Point) -> Point {
        let (x, y) = self.projection * (p.x as f32, p.y as f32);
        Point::new(f64::from(x), f64::from(y))
    }
}

/// Output size for a rectified quad: the longer of each pair of opposite
/// edges, truncated toward zero.
///
/// Fails when either side truncates to zero.
pub fn destination_size(corners: &OrderedCorners) -> Result<(u32, u32)> {
    let len = |a: Point, b: Point| -> f32 {
        let dx = (a.x - b.x) as f32;
        let dy = (a.y - b.y) as f32;
        (dx * dx + dy * dy).sqrt()
    };

    let width = len(corners.bottom_right, corners.bottom_left)
        .max(len(corners.top_right, corners.top_left)) as i64;
    let height = len(corners.top_right, corners.bottom_right)
        .max(len(corners.top_left, corners.bottom_left)) as i64;

    if width <= 0 || height <= 0 {
        return Err(KantwerkError::DegenerateQuadrilateral(format!(
            "rectified size {}x{} is empty",
            width, height
        )));
    }
    let width = u32::try_from(width)
        .map_err(|_| KantwerkError::DegenerateQuadrilateral(format!("width {} overflows", width)))?;
    let height = u32::try_from(height).map_err(|_| {
        KantwerkError::DegenerateQuadrilateral(format!("height {} overflows", height))
    })?;
    Ok((width, height))
}

/// Warp the region enclosed by `corners` into an upright rectangle.
///
/// The output keeps the input's pixel layout for `Luma8`, `LumaA8`, `Rgb8`
/// and `Rgba8`; other layouts are warped as `Rgba8`. Destination pixels that
/// map outside the source are zero.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn rectify(image: &DynamicImage, corners: &OrderedCorners) -> Result<DynamicImage> {
    let source = corners.to_array();
    let (out_w, out_h) = destination_size(corners)?;
    let (w, h) = (f64::from(out_w), f64::from(out_h));
    let target = [
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ];

    let transform = PerspectiveTransform::from_correspondences(&source, &target)?;
    debug!(out_w, out_h, "Projection solved");
    let projection = transform.projection();

    let warped = match image {
        DynamicImage::ImageLuma8(src) => {
            let mut out = GrayImage::new(out_w, out_h);
            warp_into(src, projection, Interpolation::Bilinear, Luma([0]), &mut out);
            DynamicImage::ImageLuma8(out)
        }
        DynamicImage::ImageLumaA8(src) => {
            let mut out = GrayAlphaImage::new(out_w, out_h);
            warp_into(src, projection, Interpolation::Bilinear, LumaA([0, 0]), &mut out);
            DynamicImage::ImageLumaA8(out)
        }
        DynamicImage::ImageRgb8(src) => {
            let mut out = RgbImage::new(out_w, out_h);
            warp_into(src, projection, Interpolation::Bilinear, Rgb([0, 0, 0]), &mut out);
            DynamicImage::ImageRgb8(out)
        }
        other => {
            let src = other.to_rgba8();
            let mut out = RgbaImage::new(out_w, out_h);
            warp_into(&src, projection, Interpolation::Bilinear, Rgba([0, 0, 0, 0]), &mut out);
            DynamicImage::ImageRgba8(out)
        }
    };

    info!(out_w, out_h, "Perspective rectification applied");
    Ok(warped)
}

fn quad_area(points: &[Point; 4]) -> f64 {
    let mut twice = 0.0;
    for i in 0..4 {
        let j = (i + 1) % 4;
        twice += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    twice.abs() / 2.0
}
