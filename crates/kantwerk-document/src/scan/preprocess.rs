// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preprocessing ahead of edge detection: grayscale conversion, optional
// morphological closing (suppresses printed text inside the page) and
// Gaussian smoothing.

use image::{DynamicImage, GrayImage};
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{Mask, grayscale_close};
use kantwerk_core::config::PreprocessConfig;
use tracing::debug;

/// Produce the smoothed single-channel image consumed by the candidate
/// extractor.
pub fn preprocess(image: &DynamicImage, config: &PreprocessConfig) -> GrayImage {
    let gray = image.to_luma8();

    let source = if config.close_before_blur {
        let radius = closing_radius(config);
        debug!(radius, "Closing grayscale image before blur");
        close(&gray, radius)
    } else {
        gray
    };

    if config.blur_sigma > 0.0 {
        gaussian_blur_f32(&source, config.blur_sigma)
    } else {
        source
    }
}

/// Effective half-width of the closing window. `n` passes with a `k x k`
/// square are one pass with a `(n * (k - 1) + 1)` square.
fn closing_radius(config: &PreprocessConfig) -> u8 {
    let radius = u32::from(config.closing_kernel / 2) * u32::from(config.closing_iterations);
    u8::try_from(radius).unwrap_or(u8::MAX)
}

/// Grayscale closing (dilate then erode) with a square window of half-width
/// `radius`.
pub fn close(image: &GrayImage, radius: u8) -> GrayImage {
    if radius == 0 {
        return image.clone();
    }
    grayscale_close(image, &Mask::square(radius))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    /// White page with a dark two-pixel "text" stroke across it.
    fn page_with_stroke() -> GrayImage {
        let mut img = GrayImage::from_pixel(60, 60, Luma([230u8]));
        for x in 10..50 {
            img.put_pixel(x, 30, Luma([20u8]));
            img.put_pixel(x, 31, Luma([20u8]));
        }
        img
    }

    #[test]
    fn output_is_single_channel_and_same_size() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([10, 200, 30])));
        let out = preprocess(&img, &PreprocessConfig::default());
        assert_eq!(out.dimensions(), (40, 30));
    }

    #[test]
    fn closing_removes_thin_dark_strokes() {
        let closed = close(&page_with_stroke(), 6);
        assert!(closed.pixels().all(|p| p.0[0] == 230));
    }

    #[test]
    fn closing_keeps_large_dark_regions() {
        let mut img = GrayImage::from_pixel(60, 60, Luma([230u8]));
        for y in 0..60 {
            for x in 0..30 {
                img.put_pixel(x, y, Luma([0u8]));
            }
        }
        let closed = close(&img, 6);
        assert_eq!(closed.get_pixel(5, 30).0[0], 0);
        assert_eq!(closed.get_pixel(55, 30).0[0], 230);
    }

    #[test]
    fn default_mode_keeps_strokes_and_closing_mode_drops_them() {
        let page = DynamicImage::ImageLuma8(page_with_stroke());

        let historic = preprocess(&page, &PreprocessConfig::default());
        let corrected = preprocess(
            &page,
            &PreprocessConfig {
                close_before_blur: true,
                ..PreprocessConfig::default()
            },
        );

        // The stroke still darkens the blurred original...
        assert!(historic.get_pixel(30, 30).0[0] < 200);
        // ...but is gone once the closing feeds the blur.
        assert!(corrected.get_pixel(30, 30).0[0] >= 229);
    }

    #[test]
    fn closing_radius_matches_iterated_kernel() {
        assert_eq!(closing_radius(&PreprocessConfig::default()), 6);

        let huge = PreprocessConfig {
            closing_kernel: 255,
            closing_iterations: 255,
            ..PreprocessConfig::default()
        };
        assert_eq!(closing_radius(&huge), u8::MAX);
    }

    #[test]
    fn closing_fills_gap_narrower_than_window() {
        // Dark gap 10 px wide: narrower than the 13 px window, so it closes.
        let mut img = GrayImage::from_pixel(60, 20, Luma([200u8]));
        for y in 0..20 {
            for x in 25..35 {
                img.put_pixel(x, y, Luma([40u8]));
            }
        }
        let closed = close(&img, 6);
        assert_eq!(closed.get_pixel(30, 10).0[0], 200);
        assert_eq!(close(&img, 0), img);
    }
}
