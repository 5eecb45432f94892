// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// kantwerk-bridge: C ABI over the Kantwerk detection pipeline.
//
// Host applications (camera plugins, mobile shells) link the `cdylib` or
// `staticlib` build and call the `extern "C"` functions in `ffi`. Results are
// plain `#[repr(C)]` values returned by value; nothing crosses the boundary
// that the host would have to free.

pub mod ffi;

pub use ffi::{detect_document_edges, detect_document_edges_streaming, kantwerk_version};
pub use kantwerk_core::{Coordinate, DetectionResult};
