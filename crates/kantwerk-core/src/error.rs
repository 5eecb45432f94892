// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Kantwerk.

use thiserror::Error;

/// Top-level error type for all Kantwerk operations.
///
/// Most variants never reach a host application: the detection entry points
/// absorb them into a fallback result. `DegenerateQuadrilateral` is the one
/// failure that `rectify` reports explicitly.
#[derive(Debug, Error)]
pub enum KantwerkError {
    // -- Input errors --
    #[error("image has zero width or height")]
    EmptyImage,

    #[error("failed to load image {path}: {reason}")]
    ImageLoad { path: String, reason: String },

    #[error("invalid pixel buffer: {0}")]
    InvalidBuffer(String),

    // -- Detection errors --
    #[error("no document quadrilateral found")]
    NoQuadrilateralFound,

    #[error("degenerate quadrilateral: {0}")]
    DegenerateQuadrilateral(String),

    // -- Output errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, KantwerkError>;
