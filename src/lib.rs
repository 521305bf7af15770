//! # thumbcascade
//!
//! Turns an image file into a small thumbnail that fits a bounding box, using
//! whichever image backend on the host can handle it.
//!
//! # Architecture: Validate, Then Cascade
//!
//! ```text
//! 1. Validate  source  →  SourceDescriptor   (exists, byte limit, format sniff)
//! 2. Cascade   backends in fixed order       (ImageMagick → libvips → image-rs)
//! 3. Promote   staged output  →  target      (atomic rename, never partial)
//! ```
//!
//! Every backend answers an attempt with one of three outcomes: it wrote the
//! thumbnail, it declines (not installed, cannot read this input), or it
//! rejects the input outright. Only a rejection or a validation failure is an
//! error for the caller; declines just move on to the next backend.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `ThumbnailConfig` limits and output settings, TOML loading, stock config |
//! | [`imaging`] | Dimension planning, validation, the three backends, the cascade |
//! | [`output`] | CLI output formatting for created thumbnails and the backend list |
//!
//! # Design Decisions
//!
//! ## Config Is a Value
//!
//! Limits and output settings travel as an explicit [`config::ThumbnailConfig`]
//! passed into every call. There is no global state, so two thumbnailers with
//! different bounding boxes can run side by side in one process.
//!
//! ## Fixed Backend Order
//!
//! ImageMagick runs first because it works out of process and reads the most
//! formats. libvips is next: it is linked in only with the `vips` feature and
//! enforces the pixel budget from the image header before decoding. The
//! pure-Rust `image` crate is last and always present, so a default build
//! handles GIF, JPEG and PNG with no system packages at all.
//!
//! ## No Partial Output
//!
//! Backends write into a temporary file beside the target. Only a non-empty
//! result is renamed into place, so a failed conversion never leaves a
//! truncated thumbnail behind and never clobbers an existing one.

pub mod config;
pub mod imaging;
pub mod output;
