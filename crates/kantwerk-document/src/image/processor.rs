// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: loading, raw camera-buffer wrapping, fixed rotation,
// grayscale, median blur and global binarization. Operates on in-memory images
// using the `image` and `imageproc` crates.

use image::{DynamicImage, ImageBuffer, ImageFormat};
use imageproc::contrast::{self, ThresholdType};
use imageproc::filter::median_filter;
use kantwerk_core::error::{KantwerkError, Result};
use tracing::{debug, info, instrument};

/// Image processing pipeline operating on a single in-memory image.
///
/// All operations are non-destructive: each method consumes `self` and returns a
/// new `ImageProcessor` wrapping the transformed image, enabling method chaining.
///
/// ```ignore
/// ImageProcessor::open("page.jpg")?
///     .rotate_clockwise()
///     .grayscale()
///     .median_blur(1)
///     .binarize(150)
///     .save("page-scan.png")?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let img = image::open(path.as_ref()).map_err(|err| KantwerkError::ImageLoad {
            path: path.as_ref().display().to_string(),
            reason: err.to_string(),
        })?;
        info!(
            width = img.width(),
            height = img.height(),
            "Image loaded"
        );
        Ok(Self { image: img })
    }

    /// Wrap an uncompressed, row-major pixel buffer as delivered by a camera
    /// stream.
    ///
    /// `bytes_per_pixel` selects the layout: 1 = gray, 2 = gray + alpha,
    /// 3 = RGB, 4 = RGBA. The buffer must hold at least
    /// `width * height * bytes_per_pixel` bytes; any trailing bytes are ignored.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_raw(width: u32, height: u32, bytes_per_pixel: u32, data: &[u8]) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(KantwerkError::EmptyImage);
        }

        let required = (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(bytes_per_pixel as usize))
            .ok_or_else(|| KantwerkError::InvalidBuffer("buffer size overflows".into()))?;
        if data.len() < required {
            return Err(KantwerkError::InvalidBuffer(format!(
                "expected {} bytes for {}x{}x{}, got {}",
                required,
                width,
                height,
                bytes_per_pixel,
                data.len()
            )));
        }
        let pixels = data[..required].to_vec();

        let image = match bytes_per_pixel {
            1 => ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8),
            2 => ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageLumaA8),
            3 => ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
            4 => ImageBuffer::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8),
            other => {
                return Err(KantwerkError::InvalidBuffer(format!(
                    "unsupported bytes per pixel: {}",
                    other
                )));
            }
        }
        .ok_or_else(|| KantwerkError::InvalidBuffer("buffer does not match dimensions".into()))?;

        debug!(width, height, bytes_per_pixel, "Wrapped raw pixel buffer");
        Ok(Self { image })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Rotate the image by 90 degrees clockwise (lossless).
    #[instrument(skip(self))]
    pub fn rotate_clockwise(self) -> Self {
        debug!(
            from_w = self.image.width(),
            from_h = self.image.height(),
            "Rotating 90° clockwise"
        );
        Self {
            image: self.image.rotate90(),
        }
    }

    /// Convert the image to single-channel 8-bit grayscale (luma).
    #[instrument(skip(self))]
    pub fn grayscale(self) -> Self {
        debug!("Converting to grayscale");
        Self {
            image: DynamicImage::ImageLuma8(self.image.to_luma8()),
        }
    }

    /// Median filter with a `(2 * radius + 1)` square window on the luma
    /// channel. The result is grayscale.
    #[instrument(skip(self))]
    pub fn median_blur(self, radius: u32) -> Self {
        debug!(radius, "Applying median blur");
        let gray = self.image.to_luma8();
        Self {
            image: DynamicImage::ImageLuma8(median_filter(&gray, radius, radius)),
        }
    }

    /// Global binarization: luma values strictly above `threshold` become
    /// white (255), everything else black (0).
    #[instrument(skip(self))]
    pub fn binarize(self, threshold: u8) -> Self {
        info!(threshold, "Applying fixed-threshold binarization");

        let output = contrast::threshold(&self.image.to_luma8(), threshold, ThresholdType::Binary);

        Self {
            image: DynamicImage::ImageLuma8(output),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Write the image to a file. The format is inferred from the file extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        save_dynamic(&self.image, path)
    }
}

/// Write a `DynamicImage` to `path`, inferring the format from the extension.
///
/// JPEG cannot carry an alpha channel, so images with alpha are flattened to
/// RGB first when the target is `.jpg`/`.jpeg`.
pub(crate) fn save_dynamic(image: &DynamicImage, path: impl AsRef<std::path::Path>) -> Result<()> {
    let path = path.as_ref();
    let is_jpeg = matches!(ImageFormat::from_path(path), Ok(ImageFormat::Jpeg));

    let outcome = if is_jpeg && image.color().has_alpha() {
        DynamicImage::ImageRgb8(image.to_rgb8()).save(path)
    } else {
        image.save(path)
    };

    outcome.map_err(|err| {
        KantwerkError::ImageError(format!(
            "failed to save image to {}: {}",
            path.display(),
            err
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn from_raw_wraps_each_supported_depth() {
        for (bpp, channels) in [(1u32, 1u8), (2, 2), (3, 3), (4, 4)] {
            let data = vec![7u8; (4 * 3 * bpp) as usize];
            let processor = ImageProcessor::from_raw(4, 3, bpp, &data).expect("wrap raw");
            let image = processor.into_dynamic();
            assert_eq!(image.dimensions(), (4, 3));
            assert_eq!(image.color().channel_count(), channels);
        }
    }

    #[test]
    fn from_raw_rejects_short_buffer() {
        let data = vec![0u8; 10];
        let err = ImageProcessor::from_raw(4, 4, 3, &data).err().expect("should fail");
        assert!(matches!(err, KantwerkError::InvalidBuffer(_)));
    }

    #[test]
    fn from_raw_rejects_unknown_depth() {
        let data = vec![0u8; 4 * 4 * 5];
        assert!(matches!(
            ImageProcessor::from_raw(4, 4, 5, &data),
            Err(KantwerkError::InvalidBuffer(_))
        ));
    }

    #[test]
    fn from_raw_zero_size_is_empty_image() {
        assert!(matches!(
            ImageProcessor::from_raw(0, 4, 3, &[]),
            Err(KantwerkError::EmptyImage)
        ));
    }

    #[test]
    fn rotate_clockwise_swaps_dimensions_and_moves_top_left_to_top_right() {
        let mut img = RgbImage::new(4, 2);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        let rotated = ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(img))
            .rotate_clockwise()
            .into_dynamic();

        assert_eq!(rotated.dimensions(), (2, 4));
        assert_eq!(rotated.to_rgb8().get_pixel(1, 0), &Rgb([255, 0, 0]));
    }

    #[test]
    fn binarize_is_two_valued_and_strict() {
        let img = GrayImage::from_fn(3, 1, |x, _| Luma([[149u8, 150, 151][x as usize]]));
        let out = ImageProcessor::from_dynamic(DynamicImage::ImageLuma8(img))
            .binarize(150)
            .into_dynamic()
            .to_luma8();

        assert_eq!(out.get_pixel(0, 0).0[0], 0);
        assert_eq!(out.get_pixel(1, 0).0[0], 0);
        assert_eq!(out.get_pixel(2, 0).0[0], 255);
    }

    #[test]
    fn median_blur_removes_isolated_speck() {
        let mut img = GrayImage::from_pixel(5, 5, Luma([0u8]));
        img.put_pixel(2, 2, Luma([255u8]));
        let out = ImageProcessor::from_dynamic(DynamicImage::ImageLuma8(img))
            .median_blur(1)
            .into_dynamic()
            .to_luma8();
        assert_eq!(out.get_pixel(2, 2).0[0], 0);
    }

    #[test]
    fn open_missing_file_is_image_load_error() {
        let err = ImageProcessor::open("/definitely/not/here.png").err().expect("should fail");
        assert!(matches!(err, KantwerkError::ImageLoad { .. }));
    }

    #[test]
    fn save_jpeg_drops_alpha() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.jpg");
        let img = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            4,
            4,
            image::Rgba([10, 20, 30, 255]),
        ));
        ImageProcessor::from_dynamic(img).save(&path).expect("save jpeg");
        assert!(path.exists());
    }
}
