//! Pre-flight checks run once before any backend.
//!
//! Only properties of the file itself are checked here: that it can be read
//! and that its byte size fits the budget. The pixel budget needs decoded
//! dimensions and is left to the first backend that decodes.

use super::backend::ThumbnailError;
use super::source::{self, SourceDescriptor};
use crate::config::ThumbnailConfig;
use std::fs::File;
use std::path::Path;

/// Check `path` against the config and probe its header.
pub fn validate(path: &Path, config: &ThumbnailConfig) -> Result<SourceDescriptor, ThumbnailError> {
    let not_found = || ThumbnailError::NotFound {
        path: path.to_path_buf(),
    };

    let metadata = std::fs::metadata(path).map_err(|_| not_found())?;
    if !metadata.is_file() {
        return Err(not_found());
    }
    File::open(path).map_err(|_| not_found())?;

    let size = metadata.len();
    if size > config.source_max_bytes {
        return Err(ThumbnailError::TooLarge {
            size,
            max: config.source_max_bytes,
        });
    }

    Ok(source::probe(path, size))
}
