//! Image thumbnailing with a cascade of backends.
//!
//! | Step | Where |
//! |---|---|
//! | **Validate** (exists, byte limit, sniff format) | [`validate()`] |
//! | **Plan** the output size inside the bounding box | [`plan_dimensions`] |
//! | **ImageMagick** `convert` subprocess | [`CommandLineBackend`] |
//! | **libvips** in-process (feature `vips`) | [`NativeLibraryBackend`] |
//! | **image-rs** decode, Lanczos3, encode | [`RasterLibraryBackend`] |
//! | **Cascade** and atomic promotion | [`Thumbnailer`] |
//!
//! The module is split into:
//! - **Calculations**: pure dimension math (unit testable)
//! - **Parameters**: data handed to every backend attempt
//! - **Backend**: [`ImageBackend`] trait plus the three implementations
//! - **Cascade**: validation, backend ordering, outcome handling

pub mod backend;
mod calculations;
mod cascade;
pub mod magick_backend;
mod params;
pub mod rust_backend;
pub mod source;
mod staging;
mod validate;
pub mod vips_backend;

pub use backend::{BackendOutcome, Dimensions, ImageBackend, ThumbnailError};
pub use calculations::{FitEdge, dominant_edge, plan_dimensions};
pub use cascade::{Thumbnail, Thumbnailer, create_thumbnail};
pub use magick_backend::CommandLineBackend;
pub use params::{AttemptParams, Quality};
pub use rust_backend::RasterLibraryBackend;
pub use source::{SourceDescriptor, SourceFormat};
pub use validate::validate;
pub use vips_backend::NativeLibraryBackend;
