//! Scratch output for a single backend attempt.
//!
//! Each attempt writes into a fresh temporary file in the target's directory.
//! The target path itself is only touched by [`StagedOutput::commit`], which
//! renames the scratch file into place. A declined attempt drops its
//! [`StagedOutput`] and the scratch file goes with it, so the next backend
//! never sees leftovers and a failed conversion leaves no target behind.

use crate::config::TargetFormat;
use std::io;
use std::path::Path;
use tempfile::{Builder, TempPath};

pub struct StagedOutput {
    path: TempPath,
}

impl StagedOutput {
    /// Create an empty scratch file beside `target`.
    ///
    /// The file carries the target format's extension because some libraries
    /// pick the encoder from it.
    pub fn beside(target: &Path, format: TargetFormat) -> io::Result<Self> {
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let suffix = format!(".{}", format.extension());
        let file = Builder::new()
            .prefix(".thumb-")
            .suffix(&suffix)
            .tempfile_in(dir)?;
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of what the backend wrote, 0 when the file is gone.
    pub fn written_len(&self) -> u64 {
        std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    /// Move the scratch file onto `target`, replacing any existing file.
    ///
    /// Returns the number of bytes committed, or `None` (and deletes the
    /// scratch file) when the backend left it empty.
    pub fn commit(self, target: &Path) -> io::Result<Option<u64>> {
        let len = self.written_len();
        if len == 0 {
            return Ok(None);
        }
        self.path.persist(target).map_err(|e| e.error)?;
        Ok(Some(len))
    }
}
