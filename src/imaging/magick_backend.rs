//! ImageMagick command-line backend.
//!
//! Runs the configured `convert` binary as a subprocess:
//!
//! ```text
//! convert <source> -resize WxH -background white -alpha remove -quality Q <fmt>:<output>
//! ```
//!
//! The tool is treated as a black box. Any failure (binary missing, non-zero
//! exit, nothing written) is a decline; stderr is kept for debug logs only.
//! Success means the output file exists and is not empty, nothing more.

use super::backend::{BackendOutcome, ImageBackend};
use super::params::AttemptParams;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

pub struct CommandLineBackend {
    program: PathBuf,
}

impl CommandLineBackend {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Resolve the program the way a shell would: paths are used as given,
    /// bare names are searched on `PATH`.
    fn resolve(&self) -> Option<PathBuf> {
        if self.program.components().count() > 1 {
            return self.program.is_file().then(|| self.program.clone());
        }
        let path_var = std::env::var_os("PATH")?;
        std::env::split_paths(&path_var)
            .map(|dir| dir.join(&self.program))
            .find(|candidate| candidate.is_file())
    }
}

/// Relative paths are anchored with `./` so a name such as `-flip.png` or
/// `gif:cat.png` is read as a file rather than an option or a coder prefix.
fn input_arg(path: &Path) -> OsString {
    if path.is_absolute() {
        path.as_os_str().to_os_string()
    } else {
        Path::new(".").join(path).into_os_string()
    }
}

/// Build the argument list for one conversion.
pub fn convert_args(params: &AttemptParams) -> Vec<OsString> {
    let mut target = OsString::from(format!("{}:", params.format.coder()));
    target.push(params.output.as_os_str());

    vec![
        input_arg(&params.source.path),
        "-resize".into(),
        format!("{}x{}", params.bound.width, params.bound.height).into(),
        "-background".into(),
        "white".into(),
        "-alpha".into(),
        "remove".into(),
        "-quality".into(),
        params.quality.value().to_string().into(),
        target,
    ]
}

impl ImageBackend for CommandLineBackend {
    fn name(&self) -> &'static str {
        "imagemagick"
    }

    fn is_available(&self) -> bool {
        self.resolve().is_some()
    }

    fn detail(&self) -> Option<String> {
        Some(self.program().display().to_string())
    }

    fn attempt(&self, params: &AttemptParams) -> BackendOutcome {
        let Some(program) = self.resolve() else {
            return BackendOutcome::declined(format!("{} not found", self.program.display()));
        };

        let args = convert_args(params);
        debug!(program = %program.display(), ?args, "running convert");

        let output = match Command::new(&program).args(&args).output() {
            Ok(output) => output,
            Err(e) => return BackendOutcome::declined(format!("failed to spawn: {e}")),
        };

        if !output.status.success() {
            debug!(
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "convert failed"
            );
            return BackendOutcome::declined(format!("convert exited with {}", output.status));
        }

        let written = std::fs::metadata(&params.output)
            .map(|m| m.len())
            .unwrap_or(0);
        if written == 0 {
            return BackendOutcome::declined("convert produced no output");
        }
        BackendOutcome::Success
    }
}
