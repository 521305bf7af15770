//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the capability interface every thumbnail
//! strategy implements: report whether it can run on this host, then attempt a
//! conversion and answer with a [`BackendOutcome`].
//!
//! | Outcome | Meaning | Cascade reaction |
//! |---|---|---|
//! | `Success` | output written | stop, promote output |
//! | `Declined` | not installed, cannot read this input, tool failed | try next backend |
//! | `Rejected` | input breaks a hard limit this backend checks | abort with the error |
//!
//! Production implementations, in cascade order:
//! [`CommandLineBackend`](super::magick_backend::CommandLineBackend),
//! [`NativeLibraryBackend`](super::vips_backend::NativeLibraryBackend),
//! [`RasterLibraryBackend`](super::rust_backend::RasterLibraryBackend).

use super::params::AttemptParams;
use crate::config::{ConfigError, TargetFormat};
use std::path::PathBuf;
use thiserror::Error;

/// Terminal failure of a thumbnail conversion.
#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("File {} not found or not readable", path.display())]
    NotFound { path: PathBuf },
    #[error("File too large: {size} bytes, allowed: {max} bytes")]
    TooLarge { size: u64, max: u64 },
    #[error("File pixel count is too large: {width} x {height} (allowed: {max} pixels)")]
    PixelBudgetExceeded { width: u32, height: u32, max: u64 },
    #[error("Invalid image dimensions: {width} x {height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Desired output type {0} is not available")]
    UnsupportedOutputFormat(TargetFormat),
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("No thumbnail backend available: ImageMagick, libvips and the built-in decoders all declined")]
    NoBackendAvailable,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn area(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Result of one backend attempt.
#[derive(Debug)]
pub enum BackendOutcome {
    /// The output file was written.
    Success,
    /// This backend cannot handle the input here; the reason is for logs only.
    Declined(String),
    /// The input violates a hard constraint; no other backend should try.
    Rejected(ThumbnailError),
}

impl BackendOutcome {
    pub fn declined(reason: impl Into<String>) -> Self {
        BackendOutcome::Declined(reason.into())
    }
}

/// Trait for thumbnail backends.
///
/// `is_available` is a cheap capability probe (binary on `PATH`, library
/// compiled in). The cascade queries it before every attempt and skips the
/// backend when it answers `false`. `attempt` must write only to
/// `params.output` and must not report `Success` unless it wrote there.
pub trait ImageBackend: Send + Sync {
    /// Short identifier for logs and CLI output.
    fn name(&self) -> &'static str;

    /// Whether the tooling this backend needs is present.
    fn is_available(&self) -> bool;

    /// Extra context for listings, such as the program a backend shells out to.
    fn detail(&self) -> Option<String> {
        None
    }

    /// Produce a thumbnail, or explain why not.
    fn attempt(&self, params: &AttemptParams) -> BackendOutcome;
}

/// Zero-area inputs are rejected by every backend that decodes.
pub(crate) fn invalid_dimensions(dims: Dimensions) -> BackendOutcome {
    BackendOutcome::Rejected(ThumbnailError::InvalidDimensions {
        width: dims.width,
        height: dims.height,
    })
}

pub(crate) fn pixel_budget_exceeded(dims: Dimensions, max: u64) -> BackendOutcome {
    BackendOutcome::Rejected(ThumbnailError::PixelBudgetExceeded {
        width: dims.width,
        height: dims.height,
        max,
    })
}
