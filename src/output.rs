//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Create
//!
//! ```text
//! Thumbnail thumbs/dawn.jpg
//!     Source: photos/dawn.png
//!     Backend: image-rs
//!     Size: 1342 bytes
//! ```
//!
//! ## Backends
//!
//! ```text
//! Backends
//! 001 imagemagick (convert): missing
//! 002 libvips: missing
//! 003 image-rs: available
//!
//! Target
//!     32x32 JPEG, quality 100
//!     Limits: 500000 bytes, 20000000 pixels
//! ```
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no probing.

use crate::config::{TargetFormat, ThumbnailConfig};
use crate::imaging::Thumbnail;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// One row of the `backends` listing, already probed by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendStatus {
    pub name: &'static str,
    /// Extra context shown in parens, e.g. the configured `convert` program.
    pub detail: Option<String>,
    pub available: bool,
}

// ============================================================================
// create
// ============================================================================

pub fn format_thumbnail(thumbnail: &Thumbnail, source: &Path) -> Vec<String> {
    vec![
        format!("Thumbnail {}", thumbnail.path.display()),
        format!("{}Source: {}", indent(1), source.display()),
        format!("{}Backend: {}", indent(1), thumbnail.backend),
        format!("{}Size: {} bytes", indent(1), thumbnail.bytes),
    ]
}

pub fn print_thumbnail(thumbnail: &Thumbnail, source: &Path) {
    for line in format_thumbnail(thumbnail, source) {
        println!("{}", line);
    }
}

// ============================================================================
// backends
// ============================================================================

/// Format the cascade order with availability, followed by the target settings.
pub fn format_backends(statuses: &[BackendStatus], config: &ThumbnailConfig) -> Vec<String> {
    let mut lines = vec!["Backends".to_string()];

    for (i, status) in statuses.iter().enumerate() {
        let label = match &status.detail {
            Some(detail) => format!("{} ({})", status.name, detail),
            None => status.name.to_string(),
        };
        let state = if status.available { "available" } else { "missing" };
        lines.push(format!("{} {}: {}", format_index(i + 1), label, state));
    }

    if !statuses.iter().any(|s| s.available) {
        lines.push(format!("{}No backend can run on this host", indent(1)));
    }

    lines.push(String::new());
    lines.push("Target".to_string());
    lines.push(format!(
        "{}{}x{} {}{}",
        indent(1),
        config.target_width,
        config.target_height,
        config.target_format,
        match config.target_format {
            TargetFormat::Jpeg => format!(", quality {}", config.jpeg_quality.value()),
            TargetFormat::Png | TargetFormat::Gif => String::new(),
        }
    ));
    lines.push(format!(
        "{}Limits: {} bytes, {} pixels",
        indent(1),
        config.source_max_bytes,
        config.source_max_pixels
    ));

    lines
}

pub fn print_backends(statuses: &[BackendStatus], config: &ThumbnailConfig) {
    for line in format_backends(statuses, config) {
        println!("{}", line);
    }
}
