//! Parameter types for backend attempts.
//!
//! These structs describe *what* to produce, not *how*. They are the interface
//! between the [`cascade`](super::cascade) (which decides where the output goes
//! and which limits apply) and each [`backend`](super::backend) (which does the
//! pixel work). Backends never see the whole config, only what an attempt
//! needs.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (0-100). Clamped on construction.
//! - [`AttemptParams`]: everything one attempt needs, from the source
//!   descriptor to the staged output path and the pixel budget.

use super::backend::Dimensions;
use super::source::SourceDescriptor;
use crate::config::{TargetFormat, ThumbnailConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Quality setting for lossy image encoding (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.min(100))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Value handed to encoders that only accept 1-100.
    pub fn encoder_value(self) -> u8 {
        self.0.clamp(1, 100) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(100)
    }
}

/// Parameters for a single backend attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptParams {
    pub source: SourceDescriptor,
    /// Where the backend writes. The cascade promotes this file to the real
    /// target only after the attempt succeeds.
    pub output: PathBuf,
    /// Bounding box the thumbnail must fit in.
    pub bound: Dimensions,
    pub format: TargetFormat,
    pub quality: Quality,
    pub max_pixels: u64,
}

impl AttemptParams {
    pub fn new(source: &SourceDescriptor, output: &Path, config: &ThumbnailConfig) -> Self {
        Self {
            source: source.clone(),
            output: output.to_path_buf(),
            bound: Dimensions {
                width: config.target_width,
                height: config.target_height,
            },
            format: config.target_format,
            quality: config.jpeg_quality,
            max_pixels: config.source_max_pixels,
        }
    }

    /// Whether `dims` fits the pixel budget. An area equal to the budget is
    /// still accepted.
    pub fn within_pixel_budget(&self, dims: Dimensions) -> bool {
        dims.area() <= self.max_pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 0);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_encoder_value_never_zero() {
        assert_eq!(Quality::new(0).encoder_value(), 1);
        assert_eq!(Quality::new(85).encoder_value(), 85);
    }

    #[test]
    fn quality_default_is_100() {
        assert_eq!(Quality::default().value(), 100);
    }

    #[test]
    fn attempt_params_copy_config() {
        let config = ThumbnailConfig::default()
            .with_bounding_box(64, 48)
            .with_target_format(TargetFormat::Png)
            .with_jpeg_quality(70);
        let source = SourceDescriptor::unprobed(Path::new("/in.png"), 10);
        let params = AttemptParams::new(&source, Path::new("/out.tmp"), &config);

        assert_eq!(params.bound, Dimensions { width: 64, height: 48 });
        assert_eq!(params.format, TargetFormat::Png);
        assert_eq!(params.quality.value(), 70);
        assert_eq!(params.max_pixels, 20_000_000);
        assert_eq!(params.output, PathBuf::from("/out.tmp"));
    }

    #[test]
    fn pixel_budget_boundary() {
        let config = ThumbnailConfig::default().with_source_limits(1000, 100);
        let source = SourceDescriptor::unprobed(Path::new("/in.png"), 10);
        let params = AttemptParams::new(&source, Path::new("/out.tmp"), &config);

        assert!(params.within_pixel_budget(Dimensions { width: 10, height: 10 }));
        assert!(!params.within_pixel_budget(Dimensions { width: 101, height: 1 }));
    }
}
