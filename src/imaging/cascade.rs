//! The backend cascade.
//!
//! [`Thumbnailer::create`] validates the source once, then walks the backends
//! in order until one of them produces a thumbnail:
//!
//! ```text
//! validate ──fail──▶ NotFound / TooLarge
//!    │
//!    ▼
//! backend 0 ──Declined──▶ backend 1 ──Declined──▶ backend 2 ──Declined──▶ NoBackendAvailable
//!    │ Success                │ Rejected(e)
//!    ▼                        ▼
//! promote staged output     return e, skip the rest
//! ```
//!
//! The production order is fixed: ImageMagick on the command line (no
//! in-process memory cost), then libvips (color management), then the pure
//! Rust decoders (always present).

use super::backend::{BackendOutcome, ImageBackend, ThumbnailError};
use super::magick_backend::CommandLineBackend;
use super::params::AttemptParams;
use super::rust_backend::RasterLibraryBackend;
use super::staging::StagedOutput;
use super::validate::validate;
use super::vips_backend::NativeLibraryBackend;
use crate::config::ThumbnailConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A thumbnail that was written successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub path: PathBuf,
    /// Name of the backend that produced it.
    pub backend: &'static str,
    pub bytes: u64,
}

/// Converts images to thumbnails with a fixed config and backend order.
pub struct Thumbnailer {
    config: ThumbnailConfig,
    backends: Vec<Box<dyn ImageBackend>>,
}

impl Thumbnailer {
    /// Cascade with the production backend order.
    pub fn new(config: ThumbnailConfig) -> Self {
        let backends: Vec<Box<dyn ImageBackend>> = vec![
            Box::new(CommandLineBackend::new(&config.tools.convert)),
            Box::new(NativeLibraryBackend::new()),
            Box::new(RasterLibraryBackend::new()),
        ];
        Self::with_backends(config, backends)
    }

    /// Cascade over a custom, ordered backend list.
    pub fn with_backends(config: ThumbnailConfig, backends: Vec<Box<dyn ImageBackend>>) -> Self {
        Self { config, backends }
    }

    pub fn config(&self) -> &ThumbnailConfig {
        &self.config
    }

    pub fn backends(&self) -> impl Iterator<Item = &dyn ImageBackend> {
        self.backends.iter().map(|b| b.as_ref())
    }

    /// Create a thumbnail of `source` at `target`.
    ///
    /// On error the target path is left untouched. A config that breaks its
    /// own limits fails here, before the source is even looked at.
    pub fn create(&self, source: &Path, target: &Path) -> Result<Thumbnail, ThumbnailError> {
        self.config.validate()?;
        let descriptor = validate(source, &self.config)?;
        debug!(
            source = %source.display(),
            bytes = descriptor.byte_size,
            format = ?descriptor.format,
            dimensions = ?descriptor.dimensions,
            "source validated"
        );

        for backend in &self.backends {
            let name = backend.name();
            if !backend.is_available() {
                debug!(backend = name, "skipped: not available");
                continue;
            }

            let staged = StagedOutput::beside(target, self.config.target_format)?;
            let params = AttemptParams::new(&descriptor, staged.path(), &self.config);

            match backend.attempt(&params) {
                BackendOutcome::Success => match staged.commit(target)? {
                    Some(bytes) => {
                        info!(backend = name, target = %target.display(), bytes, "thumbnail created");
                        return Ok(Thumbnail {
                            path: target.to_path_buf(),
                            backend: name,
                            bytes,
                        });
                    }
                    None => warn!(backend = name, "reported success but wrote nothing"),
                },
                BackendOutcome::Declined(reason) => {
                    debug!(backend = name, %reason, "declined");
                }
                BackendOutcome::Rejected(err) => {
                    debug!(backend = name, error = %err, "rejected");
                    return Err(err);
                }
            }
        }

        Err(ThumbnailError::NoBackendAvailable)
    }
}

/// One-shot conversion with the production backends.
pub fn create_thumbnail(
    source: &Path,
    target: &Path,
    config: &ThumbnailConfig,
) -> Result<Thumbnail, ThumbnailError> {
    Thumbnailer::new(config.clone()).create(source, target)
}
