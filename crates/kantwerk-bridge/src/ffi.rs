// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `extern "C"` entry points.
//
// Every function is total: null or malformed arguments and panics inside the
// pipeline all collapse into the unit-square result.

use std::ffi::{CStr, c_char};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};

use kantwerk_core::DetectionResult;
use kantwerk_document::DocumentDetector;
use tracing::{error, warn};

static VERSION: &CStr = match CStr::from_bytes_with_nul(
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes(),
) {
    Ok(version) => version,
    Err(_) => c"unknown",
};

/// Crate version as a static NUL-terminated string. Never null; the caller
/// must not free it.
#[unsafe(no_mangle)]
pub extern "C" fn kantwerk_version() -> *const c_char {
    VERSION.as_ptr()
}

/// Detect document corners in a raw camera frame.
///
/// `pixels` must point to `width * height * bytes_per_pixel` readable bytes
/// laid out row-major. When `output_path` is non-null the rectified colour
/// page is written there.
///
/// # Safety
///
/// `pixels` must be null or valid for reads of the stated size for the
/// duration of the call. `output_path` must be null or a NUL-terminated
/// string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn detect_document_edges_streaming(
    width: i32,
    height: i32,
    bytes_per_pixel: i32,
    pixels: *const u8,
    output_path: *const c_char,
) -> DetectionResult {
    if width == 0 || height == 0 {
        return DetectionResult::unit_square();
    }
    if pixels.is_null() {
        warn!("Null pixel buffer");
        return DetectionResult::unit_square();
    }
    let Some(len) = frame_len(width, height, bytes_per_pixel) else {
        warn!(width, height, bytes_per_pixel, "Invalid frame geometry");
        return DetectionResult::unit_square();
    };

    // SAFETY: non-null, and the caller guarantees `len` readable bytes.
    let data = unsafe { std::slice::from_raw_parts(pixels, len) };
    // SAFETY: null or NUL-terminated per the contract above.
    let output = unsafe { optional_path(output_path) };

    guarded(|| {
        DocumentDetector::default().detect_streaming(
            width,
            height,
            bytes_per_pixel,
            data,
            output.as_deref(),
        )
    })
}

/// Detect document corners in an image file. The image is rotated a quarter
/// turn clockwise before detection; when `output_path` is non-null the
/// binarized scan is written there.
///
/// # Safety
///
/// Both pointers must be null or NUL-terminated strings valid for the
/// duration of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn detect_document_edges(
    input_path: *const c_char,
    output_path: *const c_char,
) -> DetectionResult {
    // SAFETY: null or NUL-terminated per the contract above.
    let Some(input) = (unsafe { optional_path(input_path) }) else {
        warn!("Missing or non-UTF-8 input path");
        return DetectionResult::unit_square();
    };
    // SAFETY: as above.
    let output = unsafe { optional_path(output_path) };

    guarded(|| DocumentDetector::default().detect_file(&input, output.as_deref()))
}

/// Byte length of a frame, or `None` for negative or overflowing geometry.
fn frame_len(width: i32, height: i32, bytes_per_pixel: i32) -> Option<usize> {
    let w = usize::try_from(width).ok()?;
    let h = usize::try_from(height).ok()?;
    let bpp = usize::try_from(bytes_per_pixel).ok()?;
    w.checked_mul(h)?.checked_mul(bpp)
}

/// Borrow a C string as a path. Null and non-UTF-8 strings give `None`.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn optional_path(ptr: *const c_char) -> Option<PathBuf> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: checked non-null; termination is the caller's contract.
    let raw = unsafe { CStr::from_ptr(ptr) };
    raw.to_str().ok().map(|s| Path::new(s).to_path_buf())
}

/// Run `f`, turning a panic into the unit-square result.
fn guarded(f: impl FnOnce() -> DetectionResult) -> DetectionResult {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        error!("Detection panicked; returning unit square");
        DetectionResult::unit_square()
    })
}
