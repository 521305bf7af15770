//! Thumbnail configuration.
//!
//! A [`ThumbnailConfig`] is a plain value: the limits applied to a source file
//! and the preferences for the generated thumbnail. It is passed explicitly to
//! every conversion and never mutated while one is running.
//!
//! ## Config File
//!
//! The CLI reads an optional TOML file (`--config thumbcascade.toml`). Every
//! key is optional; defaults are shown below.
//!
//! ```toml
//! jpeg_quality = 100           # 0-100, only used for JPEG output
//! source_max_bytes = 500000    # larger source files are refused up front
//! source_max_pixels = 20000000 # width x height budget, checked on decode
//! target_width = 32            # bounding box of the thumbnail
//! target_height = 32
//! target_format = "JPEG"       # JPEG, PNG or GIF (case-insensitive, JPG ok)
//!
//! [tools]
//! convert = "convert"          # ImageMagick binary for the first backend
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::Quality;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Output format of the thumbnail.
///
/// Parsing is case-insensitive and accepts `JPG` as an alias, so the value
/// is always one of the three variants once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TargetFormat {
    #[default]
    Jpeg,
    Png,
    Gif,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 3] = [TargetFormat::Jpeg, TargetFormat::Png, TargetFormat::Gif];

    /// Upper-case canonical name (`JPEG`, `PNG`, `GIF`).
    pub fn as_str(self) -> &'static str {
        match self {
            TargetFormat::Jpeg => "JPEG",
            TargetFormat::Png => "PNG",
            TargetFormat::Gif => "GIF",
        }
    }

    /// Lower-case format tag understood by ImageMagick's `fmt:path` syntax.
    pub fn coder(self) -> &'static str {
        match self {
            TargetFormat::Jpeg => "jpeg",
            TargetFormat::Png => "png",
            TargetFormat::Gif => "gif",
        }
    }

    /// File extension for scratch files, used by libraries that pick the
    /// encoder from the path.
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Jpeg => "jpg",
            TargetFormat::Png => "png",
            TargetFormat::Gif => "gif",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "JPEG" | "JPG" => Ok(TargetFormat::Jpeg),
            "PNG" => Ok(TargetFormat::Png),
            "GIF" => Ok(TargetFormat::Gif),
            other => Err(ConfigError::Validation(format!(
                "target_format must be one of JPEG, PNG, GIF (got {other:?})"
            ))),
        }
    }
}

impl TryFrom<String> for TargetFormat {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TargetFormat> for String {
    fn from(format: TargetFormat) -> Self {
        format.as_str().to_string()
    }
}

/// External tool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    /// ImageMagick `convert` binary, looked up on `PATH` unless it is a path.
    pub convert: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            convert: "convert".to_string(),
        }
    }
}

/// Limits and output preferences for one thumbnail conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailConfig {
    /// JPEG compression quality (0-100). Ignored for PNG and GIF output.
    pub jpeg_quality: Quality,
    /// Maximum size of the source file in bytes.
    pub source_max_bytes: u64,
    /// Maximum decoded area (width x height) of the source image.
    pub source_max_pixels: u64,
    /// Width of the bounding box.
    pub target_width: u32,
    /// Height of the bounding box.
    pub target_height: u32,
    pub target_format: TargetFormat,
    pub tools: ToolsConfig,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: Quality::new(100),
            source_max_bytes: 500_000,
            source_max_pixels: 20_000_000,
            target_width: 32,
            target_height: 32,
            target_format: TargetFormat::Jpeg,
            tools: ToolsConfig::default(),
        }
    }
}

impl ThumbnailConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jpeg_quality.value() > 100 {
            return Err(ConfigError::Validation(
                "jpeg_quality must be 0-100".into(),
            ));
        }
        if self.source_max_bytes == 0 || self.source_max_pixels == 0 {
            return Err(ConfigError::Validation(
                "source_max_bytes and source_max_pixels must be non-zero".into(),
            ));
        }
        if self.target_width == 0 || self.target_height == 0 {
            return Err(ConfigError::Validation(
                "target_width and target_height must be non-zero".into(),
            ));
        }
        if self.tools.convert.trim().is_empty() {
            return Err(ConfigError::Validation(
                "tools.convert must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Set the output format from user input (`"png"`, `"Jpg"`, ...).
    pub fn set_target_format(&mut self, format: &str) -> Result<(), ConfigError> {
        self.target_format = format.parse()?;
        Ok(())
    }

    pub fn with_target_format(mut self, format: TargetFormat) -> Self {
        self.target_format = format;
        self
    }

    pub fn with_bounding_box(mut self, width: u32, height: u32) -> Self {
        self.target_width = width;
        self.target_height = height;
        self
    }

    pub fn with_jpeg_quality(mut self, quality: u32) -> Self {
        self.jpeg_quality = Quality::new(quality);
        self
    }

    pub fn with_source_limits(mut self, max_bytes: u64, max_pixels: u64) -> Self {
        self.source_max_bytes = max_bytes;
        self.source_max_pixels = max_pixels;
        self
    }
}

/// Load and validate a TOML config file.
pub fn load_config(path: &Path) -> Result<ThumbnailConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ThumbnailConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# thumbcascade configuration
# ==========================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# JPEG compression quality, 0-100. Ignored for PNG and GIF output.
jpeg_quality = 100

# Source files larger than this many bytes are refused before any
# backend runs.
source_max_bytes = 500000

# Maximum width x height of the decoded source image.
source_max_pixels = 20000000

# Bounding box of the thumbnail. The image is scaled down to fit on its
# longer relative side; smaller images are never enlarged.
target_width = 32
target_height = 32

# Output format: JPEG, PNG or GIF (case-insensitive, JPG is accepted).
target_format = "JPEG"

# ---------------------------------------------------------------------------
# External tools
# ---------------------------------------------------------------------------
[tools]
# ImageMagick binary used by the first backend in the cascade.
convert = "convert"
"##
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = ThumbnailConfig::default();
        assert_eq!(config.jpeg_quality.value(), 100);
        assert_eq!(config.source_max_bytes, 500_000);
        assert_eq!(config.source_max_pixels, 20_000_000);
        assert_eq!((config.target_width, config.target_height), (32, 32));
        assert_eq!(config.target_format, TargetFormat::Jpeg);
        assert_eq!(config.tools.convert, "convert");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn target_format_parses_case_insensitively() {
        assert_eq!("png".parse::<TargetFormat>().unwrap(), TargetFormat::Png);
        assert_eq!("Gif".parse::<TargetFormat>().unwrap(), TargetFormat::Gif);
        assert_eq!("JPEG".parse::<TargetFormat>().unwrap(), TargetFormat::Jpeg);
    }

    #[test]
    fn target_format_jpg_alias_normalizes_to_jpeg() {
        let mut config = ThumbnailConfig::default().with_target_format(TargetFormat::Png);
        config.set_target_format("jpg").unwrap();
        assert_eq!(config.target_format, TargetFormat::Jpeg);
        assert_eq!(config.target_format.to_string(), "JPEG");
    }

    #[test]
    fn target_format_rejects_unknown() {
        let mut config = ThumbnailConfig::default();
        assert!(config.set_target_format("webp").is_err());
        assert_eq!(config.target_format, TargetFormat::Jpeg);
    }

    #[test]
    fn parse_partial_config() {
        let config: ThumbnailConfig = toml::from_str(
            r#"
target_width = 120
target_format = "png"
"#,
        )
        .unwrap();
        assert_eq!(config.target_width, 120);
        assert_eq!(config.target_height, 32);
        assert_eq!(config.target_format, TargetFormat::Png);
        assert_eq!(config.source_max_bytes, 500_000);
    }

    #[test]
    fn parse_tools_section() {
        let config: ThumbnailConfig = toml::from_str(
            r#"
[tools]
convert = "/opt/magick/bin/convert"
"#,
        )
        .unwrap();
        assert_eq!(config.tools.convert, "/opt/magick/bin/convert");
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<ThumbnailConfig, _> = toml::from_str("target_widht = 10");
        assert!(result.is_err());
    }

    #[test]
    fn invalid_format_in_toml_rejected() {
        let result: Result<ThumbnailConfig, _> = toml::from_str(r#"target_format = "bmp""#);
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_quality_over_100() {
        let config = ThumbnailConfig {
            jpeg_quality: Quality(101),
            ..ThumbnailConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_bounding_box() {
        let config = ThumbnailConfig::default().with_bounding_box(0, 32);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_limits() {
        let config = ThumbnailConfig::default().with_source_limits(0, 100);
        assert!(config.validate().is_err());
        let config = ThumbnailConfig::default().with_source_limits(100, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("thumbcascade.toml");
        fs::write(&path, "jpeg_quality = 75\ntarget_height = 64\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.jpeg_quality.value(), 75);
        assert_eq!(config.target_height, 64);
    }

    #[test]
    fn load_config_validates() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("thumbcascade.toml");
        fs::write(&path, "jpeg_quality = 180\n").unwrap();

        assert!(matches!(
            load_config(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn load_config_missing_file_is_io_error() {
        let result = load_config(Path::new("/nonexistent/thumbcascade.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: ThumbnailConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, ThumbnailConfig::default());
    }
}
