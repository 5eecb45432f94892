// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection pipeline orchestration: wires preprocessing, candidate search,
// scoring, corner ordering and rectification together, and exposes the
// streaming (raw camera buffer) and file entry points.
//
// Entry points never fail: empty or unreadable input yields the unit square,
// an image without a usable quadrilateral yields its own bounds, and output
// persistence failures are logged while the corners are still returned.

use std::path::Path;

use image::DynamicImage;
use kantwerk_core::config::DetectorConfig;
use kantwerk_core::error::{KantwerkError, Result};
use kantwerk_core::{DetectionResult, OrderedCorners, Point};
use tracing::{debug, info, instrument, warn};

use super::candidates::extract_candidates;
use super::corners::order_corners;
use super::preprocess::preprocess;
use super::rectify::rectify;
use super::scoring::{ScoredQuad, select_best};
use crate::image::processor::{ImageProcessor, save_dynamic};

/// Outcome of running the pipeline on one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Ordered corners in pixel coordinates of the analysed image.
    pub corners: OrderedCorners,
    /// `corners` normalized by the image size.
    pub result: DetectionResult,
    pub width: u32,
    pub height: u32,
    /// Set when no quadrilateral survived and the image bounds were used.
    pub fallback: bool,
}

/// Locates a document page in a photo and rectifies it.
///
/// Immutable after construction; one detector can serve any number of threads.
#[derive(Debug, Clone, Default)]
pub struct DocumentDetector {
    config: DetectorConfig,
}

impl DocumentDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    // -- Core pipeline ----------------------------------------------------------

    /// Run preprocessing, the threshold sweep and the scorer.
    ///
    /// The returned points are in positional order (top pair, then bottom
    /// pair, each left to right).
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn find_quadrilateral(&self, image: &DynamicImage) -> Result<ScoredQuad> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(KantwerkError::EmptyImage);
        }

        let smoothed = preprocess(image, &self.config.preprocess);
        let pool = extract_candidates(&smoothed, &self.config.candidates);
        let best = select_best(&pool, width, height, &self.config.scoring)
            .ok_or(KantwerkError::NoQuadrilateralFound)?;

        debug!(
            candidates = pool.len(),
            best_width = best.width,
            best_height = best.height,
            "Best quadrilateral selected"
        );
        Ok(best)
    }

    /// Detect the document corners, falling back to the image bounds.
    ///
    /// An empty image reports the unit square; its pixel corners are the
    /// zero-area image bounds, so rectifying it fails as degenerate.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn detect(&self, image: &DynamicImage) -> Detection {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            warn!("Empty image; returning unit square");
            return Detection {
                corners: OrderedCorners::full_image(width, height),
                result: DetectionResult::unit_square(),
                width,
                height,
                fallback: true,
            };
        }

        let (points, fallback) = match self.find_quadrilateral(image) {
            Ok(best) => (best.points.map(|p| Point::new(f64::from(p.x), f64::from(p.y))), false),
            Err(err) => {
                warn!(error = %err, "Falling back to full image bounds");
                let (w, h) = (f64::from(width), f64::from(height));
                (
                    [
                        Point::new(0.0, 0.0),
                        Point::new(w, 0.0),
                        Point::new(0.0, h),
                        Point::new(w, h),
                    ],
                    true,
                )
            }
        };

        let corners = order_corners(&points);
        let result = DetectionResult::normalized(&corners, width, height);
        info!(
            fallback,
            top_left = ?result.top_left,
            bottom_right = ?result.bottom_right,
            "Document corners detected"
        );

        Detection {
            corners,
            result,
            width,
            height,
            fallback,
        }
    }

    /// Warp the detected region of `image` into an upright rectangle.
    pub fn rectify(&self, image: &DynamicImage, detection: &Detection) -> Result<DynamicImage> {
        rectify(image, &detection.corners)
    }

    /// Post-process a rectified page for the file form: grayscale, median
    /// blur, fixed-threshold binarization.
    pub fn scan_output(&self, rectified: DynamicImage) -> ImageProcessor {
        let output = &self.config.scan_output;
        ImageProcessor::from_dynamic(rectified)
            .grayscale()
            .median_blur(output.median_radius)
            .binarize(output.binary_threshold)
    }

    // -- Entry points -----------------------------------------------------------

    /// Detect corners in a raw, row-major pixel buffer.
    ///
    /// When `output` is given the colour rectified page is written there.
    #[instrument(skip(self, data), fields(data_len = data.len()))]
    pub fn detect_streaming(
        &self,
        width: i32,
        height: i32,
        bytes_per_pixel: i32,
        data: &[u8],
        output: Option<&Path>,
    ) -> DetectionResult {
        if width == 0 || height == 0 {
            debug!("Zero-sized frame; returning unit square");
            return DetectionResult::unit_square();
        }

        let image = match wrap_frame(width, height, bytes_per_pixel, data) {
            Ok(image) => image,
            Err(err) => {
                warn!(error = %err, "Rejected input frame; returning unit square");
                return DetectionResult::unit_square();
            }
        };

        let detection = self.detect(&image);
        if let Some(path) = output {
            if let Err(err) = self
                .rectify(&image, &detection)
                .and_then(|page| save_dynamic(&page, path))
            {
                warn!(error = %err, path = %path.display(), "Failed to write rectified page");
            }
        }
        detection.result
    }

    /// Detect corners in an image file.
    ///
    /// The image is rotated a quarter turn clockwise first (unless disabled in
    /// the configuration). When `output` is given the rectified page is
    /// binarized and written there, format chosen by extension.
    #[instrument(skip(self, input), fields(input = %input.display()))]
    pub fn detect_file(&self, input: &Path, output: Option<&Path>) -> DetectionResult {
        let loaded = match ImageProcessor::open(input) {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!(error = %err, "Could not load input; returning unit square");
                return DetectionResult::unit_square();
            }
        };

        let loaded = if self.config.scan_output.rotate_clockwise {
            loaded.rotate_clockwise()
        } else {
            loaded
        };
        let image = loaded.into_dynamic();

        let detection = self.detect(&image);
        if let Some(path) = output {
            let written = self
                .rectify(&image, &detection)
                .and_then(|page| self.scan_output(page).save(path));
            match written {
                Ok(()) => info!(path = %path.display(), "Scan written"),
                Err(err) => {
                    warn!(error = %err, path = %path.display(), "Failed to write scan")
                }
            }
        }
        detection.result
    }
}

/// Validate the signed frame geometry and wrap the buffer.
fn wrap_frame(width: i32, height: i32, bytes_per_pixel: i32, data: &[u8]) -> Result<DynamicImage> {
    let dim = |value: i32, name: &str| {
        u32::try_from(value)
            .map_err(|_| KantwerkError::InvalidBuffer(format!("negative {}: {}", name, value)))
    };
    let image = ImageProcessor::from_raw(
        dim(width, "width")?,
        dim(height, "height")?,
        dim(bytes_per_pixel, "bytes per pixel")?,
        data,
    )?;
    Ok(image.into_dynamic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    /// White `w` x `h` rectangle with its top-left at `(x0, y0)` on black.
    fn page(width: u32, height: u32, x0: u32, y0: u32, w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            if (x0..x0 + w).contains(&x) && (y0..y0 + h).contains(&y) {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        })
    }

    fn unit_square_corners(result: &DetectionResult) -> bool {
        *result == DetectionResult::unit_square()
    }

    #[test]
    fn centred_rectangle_is_found() {
        let img = DynamicImage::ImageLuma8(page(1000, 1000, 200, 300, 600, 400));
        let detection = DocumentDetector::default().detect(&img);

        assert!(!detection.fallback);
        let expected = [(200.0, 300.0), (800.0, 300.0), (800.0, 700.0), (200.0, 700.0)];
        for (got, (x, y)) in detection.corners.to_array().into_iter().zip(expected) {
            assert!(
                (got.x - x).abs() <= 3.0 && (got.y - y).abs() <= 3.0,
                "corner {:?}, wanted ({}, {})",
                got,
                x,
                y
            );
        }
        assert!(detection.result.is_within_unit_square());

        let page = DocumentDetector::default()
            .rectify(&img, &detection)
            .expect("rectified");
        assert!(page.width().abs_diff(600) <= 3, "width = {}", page.width());
        assert!(page.height().abs_diff(400) <= 3, "height = {}", page.height());
    }

    #[test]
    fn all_black_image_falls_back_to_bounds() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(500, 500));
        let detection = DocumentDetector::default().detect(&img);
        assert!(detection.fallback);
        assert!(unit_square_corners(&detection.result));
        assert_eq!(detection.corners, OrderedCorners::full_image(500, 500));
    }

    #[test]
    fn tiny_square_is_ignored() {
        let img = DynamicImage::ImageLuma8(page(500, 500, 240, 240, 20, 20));
        let detection = DocumentDetector::default().detect(&img);
        assert!(detection.fallback);
    }

    #[test]
    fn zero_sized_input_returns_unit_square() {
        let detector = DocumentDetector::default();
        assert!(unit_square_corners(&detector.detect_streaming(0, 480, 4, &[], None)));
        assert!(unit_square_corners(&detector.detect_streaming(640, 0, 4, &[], None)));

        let empty = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        let detection = detector.detect(&empty);
        assert!(detection.fallback);
        assert!(unit_square_corners(&detection.result));
        assert_eq!(detection.corners, OrderedCorners::full_image(0, 0));
        assert!(matches!(
            detector.rectify(&empty, &detection),
            Err(KantwerkError::DegenerateQuadrilateral(_))
        ));
    }

    #[test]
    fn invalid_frames_return_unit_square() {
        let detector = DocumentDetector::default();
        assert!(unit_square_corners(&detector.detect_streaming(-4, 4, 1, &[0; 16], None)));
        assert!(unit_square_corners(&detector.detect_streaming(4, 4, 1, &[0; 8], None)));
        assert!(unit_square_corners(&detector.detect_streaming(4, 4, 5, &[0; 80], None)));
    }

    #[test]
    fn streaming_form_detects_and_writes_colour_page() {
        let gray = page(400, 300, 80, 60, 240, 180);
        let rgba = RgbaImage::from_fn(400, 300, |x, y| {
            let v = gray.get_pixel(x, y).0[0];
            Rgba([v, v, v, 255])
        });

        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("page.png");
        let result = DocumentDetector::default().detect_streaming(
            400,
            300,
            4,
            rgba.as_raw(),
            Some(&out),
        );

        assert!(result.is_within_unit_square());
        assert!(!unit_square_corners(&result));
        // Within 3 px of (80, 60) in the 400x300 frame.
        assert!((result.top_left.x * 400.0 - 80.0).abs() <= 3.0, "{:?}", result.top_left);
        assert!((result.top_left.y * 300.0 - 60.0).abs() <= 3.0, "{:?}", result.top_left);

        let written = image::open(&out).expect("page written");
        assert!(matches!(written, DynamicImage::ImageRgba8(_)));
        assert!(written.width().abs_diff(240) <= 3, "width = {}", written.width());
        assert!(written.height().abs_diff(180) <= 3, "height = {}", written.height());
    }

    #[test]
    fn rectified_size_matches_detected_quad() {
        let img = DynamicImage::ImageLuma8(page(500, 400, 100, 80, 300, 220));
        let detector = DocumentDetector::default();
        let detection = detector.detect(&img);
        let page = detector.rectify(&img, &detection).expect("rectified");

        let expected = crate::scan::rectify::destination_size(&detection.corners).expect("size");
        assert_eq!((page.width(), page.height()), expected);
    }

    #[test]
    fn file_form_writes_two_valued_scan() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("photo.png");
        let output = dir.path().join("scan.png");
        page(400, 300, 80, 60, 240, 180).save(&input).expect("input written");

        let result = DocumentDetector::default().detect_file(&input, Some(&output));
        assert!(result.is_within_unit_square());
        assert!(!unit_square_corners(&result));

        let scan = image::open(&output).expect("scan written").to_luma8();
        assert!(scan.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        // The rotated page is 180 wide and 240 tall.
        assert!(scan.height() > scan.width());
    }

    #[test]
    fn file_form_without_rotation_keeps_orientation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("photo.png");
        let output = dir.path().join("scan.png");
        page(400, 300, 80, 60, 240, 180).save(&input).expect("input written");

        let mut config = DetectorConfig::default();
        config.scan_output.rotate_clockwise = false;
        DocumentDetector::new(config).detect_file(&input, Some(&output));

        let scan = image::open(&output).expect("scan written");
        assert!(scan.width() > scan.height());
    }

    #[test]
    fn missing_file_returns_unit_square() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = DocumentDetector::default().detect_file(&dir.path().join("absent.jpg"), None);
        assert!(unit_square_corners(&result));
    }
}
