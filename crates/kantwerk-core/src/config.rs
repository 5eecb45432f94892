// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detector configuration. `Default` reproduces the tuned constants of the
// edge-detection pipeline; every field can be overridden from JSON.

use serde::{Deserialize, Serialize};

use crate::error::{KantwerkError, Result};

/// Complete detector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DetectorConfig {
    pub preprocess: PreprocessConfig,
    pub candidates: CandidateConfig,
    pub scoring: ScoringConfig,
    pub scan_output: ScanOutputConfig,
}

/// Grayscale/smoothing stage ahead of edge detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Side of the square closing kernel (5 → 5x5).
    pub closing_kernel: u8,
    /// Dilation iterations followed by the same number of erosions.
    pub closing_iterations: u8,
    /// Feed the closed image (instead of the original) into the blur.
    ///
    /// `false` matches the historic pipeline, where the closing never
    /// reached the edge detector.
    pub close_before_blur: bool,
    /// Gaussian sigma. 2.0 is what an 11x11 kernel with sigma 0 resolves to.
    pub blur_sigma: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            closing_kernel: 5,
            closing_iterations: 3,
            close_before_blur: false,
            blur_sigma: 2.0,
        }
    }
}

/// Multi-threshold contour search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateConfig {
    /// Canny low thresholds, visited in order. High = low * `high_ratio`.
    pub canny_thresholds: Vec<f32>,
    pub high_ratio: f32,
    /// Radius of the elliptical edge dilation (4 ≈ 8x8 ellipse).
    pub edge_dilation_radius: u8,
    /// Polygon approximation tolerance as a fraction of the contour perimeter.
    pub approx_epsilon_ratio: f64,
    /// Minimum enclosed area in px².
    pub min_area: f64,
    /// Largest accepted |cos| of any corner angle.
    pub max_corner_cosine: f64,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            canny_thresholds: vec![10.0, 30.0, 50.0, 70.0],
            high_ratio: 3.0,
            edge_dilation_radius: 4,
            approx_epsilon_ratio: 0.02,
            min_area: 1000.0,
            max_corner_cosine: 0.3,
        }
    }
}

/// Size filter applied relative to the image dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Minimum width is `image_width / min_width_divisor` (integer division).
    pub min_width_divisor: u32,
    /// Minimum height is `image_height / min_height_divisor` (integer division).
    pub min_height_divisor: u32,
    /// Quads wider or taller than this fraction of the frame are rejected.
    pub max_extent_ratio: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_width_divisor: 5,
            min_height_divisor: 7,
            max_extent_ratio: 0.99,
        }
    }
}

/// Post-processing of the file-form output ("scanned document" look).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOutputConfig {
    /// Rotate file-form input 90° clockwise before detection.
    pub rotate_clockwise: bool,
    /// Median filter radius (1 → 3x3).
    pub median_radius: u32,
    /// Pixels strictly above this value become white, the rest black.
    pub binary_threshold: u8,
}

impl Default for ScanOutputConfig {
    fn default() -> Self {
        Self {
            rotate_clockwise: true,
            median_radius: 1,
            binary_threshold: 150,
        }
    }
}

impl DetectorConfig {
    /// Load a configuration from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.candidates.canny_thresholds.is_empty() {
            return Err(KantwerkError::Config(
                "at least one Canny threshold is required".into(),
            ));
        }
        if self
            .candidates
            .canny_thresholds
            .iter()
            .any(|t| !t.is_finite() || *t < 0.0)
        {
            return Err(KantwerkError::Config(
                "Canny thresholds must be finite and non-negative".into(),
            ));
        }
        if !(self.candidates.high_ratio >= 1.0) {
            return Err(KantwerkError::Config(
                "high_ratio must be at least 1".into(),
            ));
        }
        if !(self.candidates.approx_epsilon_ratio > 0.0) {
            return Err(KantwerkError::Config(
                "approx_epsilon_ratio must be positive".into(),
            ));
        }
        if self.scoring.min_width_divisor == 0 || self.scoring.min_height_divisor == 0 {
            return Err(KantwerkError::Config(
                "size divisors must be non-zero".into(),
            ));
        }
        if !(self.scoring.max_extent_ratio > 0.0) {
            return Err(KantwerkError::Config(
                "max_extent_ratio must be positive".into(),
            ));
        }
        if !(self.preprocess.blur_sigma > 0.0) {
            return Err(KantwerkError::Config(
                "blur_sigma must be positive".into(),
            ));
        }
        if self.preprocess.closing_kernel == 0 {
            return Err(KantwerkError::Config(
                "closing_kernel must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
