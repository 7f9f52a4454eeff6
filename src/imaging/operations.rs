//! High-level encode operations combining size policy with a backend.
//!
//! The policy is the one the production pipeline has always used: sources
//! wider than the threshold are downscaled to the threshold width before
//! encoding, everything else is re-encoded at its original size (with a
//! warning, since undersized product photos usually mean a bad upload).

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{EncodeParams, Quality, ResizeParams};
use log::warn;
use std::path::Path;

/// Encoding policy for promoted images.
#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions {
    pub quality: Quality,
    /// Sources wider than this are downscaled to this width.
    pub resize_threshold: u32,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
            resize_threshold: 1200,
        }
    }
}

/// Height after scaling `dims` to `target_width`, preserving aspect ratio.
/// Rounds to the nearest pixel, never below 1.
pub fn scaled_height(dims: Dimensions, target_width: u32) -> u32 {
    let h = (dims.height as u64 * target_width as u64 + dims.width as u64 / 2)
        / dims.width.max(1) as u64;
    (h as u32).max(1)
}

/// Re-encode `source` into `output` under the sizing policy.
///
/// `dims` are the source's known pixel dimensions (the scanners probe them
/// once; no second decode here).
pub fn encode_for_production(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    dims: Dimensions,
    options: &EncodeOptions,
) -> Result<(), BackendError> {
    if dims.width > options.resize_threshold {
        backend.resize(&ResizeParams {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            width: options.resize_threshold,
            height: scaled_height(dims, options.resize_threshold),
            quality: options.quality,
        })
    } else {
        warn!(
            "{} is {}px wide, below the {}px threshold; encoding at original size",
            source.display(),
            dims.width,
            options.resize_threshold
        );
        backend.transcode(&EncodeParams {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            quality: options.quality,
        })
    }
}
