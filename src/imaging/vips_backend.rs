//! libvips backend.
//!
//! Compiled only with the `vips` cargo feature, since it links against the
//! libvips system library. Without the feature the backend still exists but
//! reports itself unavailable, so the cascade falls through to the pure Rust
//! backend.
//!
//! This backend is authoritative for the pixel budget: it reads the header
//! before any pixels are decoded and rejects oversized sources for the whole
//! cascade.
//!
//! | Step | libvips call |
//! |---|---|
//! | Load (lazy, header only) | `VipsImage::new_from_file` |
//! | Profile import → sRGB export + resize | `ops::thumbnail_image_with_opts` |
//! | Force sRGB interpretation | `ops::colourspace` |
//! | Strip metadata, set quality, encode | `image_write_to_file("out.jpg[Q=..,strip]")` |
//!
//! Unlike the raster backend this one does not use
//! [`plan_dimensions`](super::calculations::plan_dimensions): it hands libvips
//! the single limiting edge from
//! [`dominant_edge`](super::calculations::dominant_edge) and lets it derive the
//! other one.

use super::backend::{BackendOutcome, ImageBackend};
use super::params::AttemptParams;

#[derive(Default)]
pub struct NativeLibraryBackend;

impl NativeLibraryBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ImageBackend for NativeLibraryBackend {
    fn name(&self) -> &'static str {
        "libvips"
    }

    fn is_available(&self) -> bool {
        #[cfg(feature = "vips")]
        {
            native::init()
        }
        #[cfg(not(feature = "vips"))]
        {
            false
        }
    }

    fn attempt(&self, params: &AttemptParams) -> BackendOutcome {
        #[cfg(feature = "vips")]
        {
            native::attempt(params)
        }
        #[cfg(not(feature = "vips"))]
        {
            let _ = params;
            BackendOutcome::declined("built without the vips feature")
        }
    }
}

#[cfg(feature = "vips")]
mod native {
    use super::super::backend::{
        BackendOutcome, Dimensions, invalid_dimensions, pixel_budget_exceeded,
    };
    use super::super::calculations::{FitEdge, dominant_edge};
    use super::super::params::AttemptParams;
    use crate::config::TargetFormat;
    use libvips::ops::{self, Interpretation, Size, ThumbnailImageOptions};
    use libvips::{VipsApp, VipsImage};
    use std::sync::OnceLock;
    use tracing::{debug, warn};

    /// Stand-in for "no limit" on the edge libvips should derive.
    /// Matches libvips' own `VIPS_MAX_COORD`.
    const UNCONSTRAINED: i32 = 10_000_000;

    static INITIALIZED: OnceLock<bool> = OnceLock::new();

    /// Start libvips once per process.
    pub(super) fn init() -> bool {
        *INITIALIZED.get_or_init(|| match VipsApp::new("thumbcascade", false) {
            Ok(app) => {
                // libvips stays up for the life of the process
                std::mem::forget(app);
                true
            }
            Err(e) => {
                warn!("libvips failed to start: {e:?}");
                false
            }
        })
    }

    fn save_options(params: &AttemptParams) -> String {
        match params.format {
            TargetFormat::Jpeg => format!("[Q={},strip]", params.quality.encoder_value()),
            TargetFormat::Png | TargetFormat::Gif => "[strip]".to_string(),
        }
    }

    pub(super) fn attempt(params: &AttemptParams) -> BackendOutcome {
        if !init() {
            return BackendOutcome::declined("libvips not initialised");
        }
        let Some(source) = params.source.path.to_str() else {
            return BackendOutcome::declined("source path is not valid UTF-8");
        };
        let Some(output) = params.output.to_str() else {
            return BackendOutcome::declined("output path is not valid UTF-8");
        };

        let image = match VipsImage::new_from_file(source) {
            Ok(image) => image,
            Err(e) => return BackendOutcome::declined(format!("libvips load failed: {e:?}")),
        };

        let dims = Dimensions {
            width: image.get_width().max(0) as u32,
            height: image.get_height().max(0) as u32,
        };
        if dims.area() == 0 {
            return invalid_dimensions(dims);
        }
        if !params.within_pixel_budget(dims) {
            return pixel_budget_exceeded(dims, params.max_pixels);
        }
        let Some(edge) = dominant_edge(dims, params.bound) else {
            return invalid_dimensions(params.bound);
        };

        let base = ThumbnailImageOptions {
            size: Size::Down,
            import_profile: "srgb".into(),
            export_profile: "srgb".into(),
            ..ThumbnailImageOptions::default()
        };
        let (width, opts) = match edge {
            FitEdge::Width(w) => (
                w as i32,
                ThumbnailImageOptions {
                    height: UNCONSTRAINED,
                    ..base
                },
            ),
            FitEdge::Height(h) => (
                UNCONSTRAINED,
                ThumbnailImageOptions {
                    height: h as i32,
                    ..base
                },
            ),
        };
        debug!(?edge, ?dims, "libvips thumbnail");

        let result = ops::thumbnail_image_with_opts(&image, width, &opts)
            .and_then(|thumb| ops::colourspace(&thumb, Interpretation::Srgb))
            .and_then(|srgb| srgb.image_write_to_file(&format!("{output}{}", save_options(params))));

        match result {
            Ok(()) => BackendOutcome::Success,
            Err(e) => BackendOutcome::declined(format!("libvips thumbnail failed: {e:?}")),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::config::ThumbnailConfig;
        use crate::imaging::SourceDescriptor;
        use std::path::Path;

        #[test]
        fn save_options_carry_quality_for_jpeg_only() {
            let config = ThumbnailConfig::default().with_jpeg_quality(80);
            let source = SourceDescriptor::unprobed(Path::new("/in.png"), 1);
            let params = AttemptParams::new(&source, Path::new("/out.jpg"), &config);
            assert_eq!(save_options(&params), "[Q=80,strip]");

            let config = config.with_target_format(TargetFormat::Png);
            let params = AttemptParams::new(&source, Path::new("/out.png"), &config);
            assert_eq!(save_options(&params), "[strip]");
        }
    }
}
