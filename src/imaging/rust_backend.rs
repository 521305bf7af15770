//! Pure Rust raster backend, the last resort of the cascade.
//!
//! Everything is statically linked into the binary, so this backend works on
//! any host, limited only by which `image` codecs were compiled in.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (GIF, JPEG, PNG) | `image` crate, gated by `ImageFormat::reading_enabled` |
//! | Decode (WBMP) | none, always declined |
//! | Resize | `image::imageops::resize` with `Lanczos3` filter |
//! | Compose | transparent `RgbaImage` canvas + `imageops::replace` (no blending) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with configured quality |
//! | Encode → PNG / GIF | `DynamicImage::write_to`, gated by `ImageFormat::writing_enabled` |

use super::backend::{
    BackendOutcome, Dimensions, ImageBackend, ThumbnailError, invalid_dimensions,
    pixel_budget_exceeded,
};
use super::calculations::plan_dimensions;
use super::params::{AttemptParams, Quality};
use super::source::SourceFormat;
use crate::config::TargetFormat;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Fully transparent white: what the canvas shows wherever the source does.
const TRANSPARENT: Rgba<u8> = Rgba([255, 255, 255, 0]);

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
#[derive(Default)]
pub struct RasterLibraryBackend;

impl RasterLibraryBackend {
    pub fn new() -> Self {
        Self
    }
}

fn encoder_format(format: TargetFormat) -> ImageFormat {
    match format {
        TargetFormat::Jpeg => ImageFormat::Jpeg,
        TargetFormat::Png => ImageFormat::Png,
        TargetFormat::Gif => ImageFormat::Gif,
    }
}

/// Whether an encoder for `format` is compiled in.
pub fn encoder_available(format: TargetFormat) -> bool {
    encoder_format(format).writing_enabled()
}

/// Load and decode an image from disk with the probed decoder.
fn load_image(path: &Path, format: ImageFormat) -> Result<DynamicImage, String> {
    let mut reader = ImageReader::open(path).map_err(|e| e.to_string())?;
    reader.set_format(format);
    reader
        .decode()
        .map_err(|e| format!("Failed to decode {}: {}", path.display(), e))
}

/// Resize `img` to `size` and place it on a transparent canvas.
///
/// Pixels are copied, not blended, so transparent source regions stay
/// transparent instead of picking up a background color.
fn compose_on_transparent(img: &DynamicImage, size: Dimensions) -> RgbaImage {
    // Rounding may plan a zero-pixel edge for extreme aspect ratios
    let width = size.width.max(1);
    let height = size.height.max(1);

    let resized = imageops::resize(&img.to_rgba8(), width, height, FilterType::Lanczos3);
    let mut canvas = RgbaImage::from_pixel(width, height, TRANSPARENT);
    imageops::replace(&mut canvas, &resized, 0, 0);
    canvas
}

/// Drop the alpha channel by compositing onto white, for formats without one.
fn flatten_onto_white(canvas: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(canvas.width(), canvas.height(), |x, y| {
        let Rgba([r, g, b, a]) = *canvas.get_pixel(x, y);
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Encode the canvas in the target format into memory.
fn encode(canvas: RgbaImage, format: TargetFormat, quality: Quality) -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    match format {
        TargetFormat::Jpeg => {
            let flat = DynamicImage::ImageRgb8(flatten_onto_white(&canvas));
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.encoder_value());
            flat.write_with_encoder(encoder)
                .map_err(|e| format!("JPEG encode failed: {e}"))?;
        }
        TargetFormat::Png | TargetFormat::Gif => {
            DynamicImage::ImageRgba8(canvas)
                .write_to(&mut Cursor::new(&mut buf), encoder_format(format))
                .map_err(|e| format!("{format} encode failed: {e}"))?;
        }
    }
    Ok(buf)
}

impl ImageBackend for RasterLibraryBackend {
    fn name(&self) -> &'static str {
        "image-rs"
    }

    fn is_available(&self) -> bool {
        [SourceFormat::Gif, SourceFormat::Jpeg, SourceFormat::Png]
            .iter()
            .any(|format| format.decoder_available())
    }

    fn attempt(&self, params: &AttemptParams) -> BackendOutcome {
        let Some(source_format) = params.source.format else {
            return BackendOutcome::declined("unrecognised source format");
        };
        let Some(decoder) = source_format
            .image_format()
            .filter(|format| format.reading_enabled())
        else {
            return BackendOutcome::declined(format!(
                "no {} decoder compiled in",
                source_format.name()
            ));
        };
        let Some(dims) = params.source.dimensions else {
            return BackendOutcome::declined("could not read source dimensions");
        };

        if dims.area() == 0 {
            return invalid_dimensions(dims);
        }
        if !params.within_pixel_budget(dims) {
            return pixel_budget_exceeded(dims, params.max_pixels);
        }
        let Some(plan) = plan_dimensions(dims, params.bound) else {
            return invalid_dimensions(params.bound);
        };
        if !encoder_available(params.format) {
            return BackendOutcome::Rejected(ThumbnailError::UnsupportedOutputFormat(params.format));
        }

        let img = match load_image(&params.source.path, decoder) {
            Ok(img) => img,
            Err(reason) => return BackendOutcome::Declined(reason),
        };
        debug!(?dims, ?plan, format = %params.format, "raster resize");

        let canvas = compose_on_transparent(&img, plan);
        let bytes = match encode(canvas, params.format, params.quality) {
            Ok(bytes) => bytes,
            Err(reason) => return BackendOutcome::Declined(reason),
        };
        match std::fs::write(&params.output, bytes) {
            Ok(()) => BackendOutcome::Success,
            Err(e) => BackendOutcome::declined(format!("write failed: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThumbnailConfig;
    use crate::imaging::source;
    use image::{ImageEncoder, ImageReader};

    /// Create a small valid JPEG file with the given dimensions.
    fn create_test_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let file = std::fs::File::create(path).unwrap();
        let writer = std::io::BufWriter::new(file);
        JpegEncoder::new(writer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
    }

    /// PNG whose left half is opaque red and right half fully transparent.
    fn create_half_transparent_png(path: &Path, width: u32, height: u32) {
        RgbaImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
        .save(path)
        .unwrap();
    }

    fn params_for(source: &Path, output: &Path, config: &ThumbnailConfig) -> AttemptParams {
        let size = std::fs::metadata(source).unwrap().len();
        AttemptParams::new(&source::probe(source, size), output, config)
    }

    fn decode(path: &Path) -> DynamicImage {
        ImageReader::open(path)
            .unwrap()
            .with_guessed_format()
            .unwrap()
            .decode()
            .unwrap()
    }

    #[test]
    fn encoders_compiled_in() {
        for format in TargetFormat::ALL {
            assert!(encoder_available(format), "{format} encoder missing");
        }
        assert!(RasterLibraryBackend::new().is_available());
    }

    #[test]
    fn jpeg_source_to_jpeg_thumbnail_uses_plan() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        let output = tmp.path().join("thumb.jpg");
        create_test_jpeg(&source, 200, 500);

        let params = params_for(&source, &output, &ThumbnailConfig::default());
        assert!(matches!(
            RasterLibraryBackend::new().attempt(&params),
            BackendOutcome::Success
        ));

        let thumb = decode(&output);
        // 200x500 in 32x32 → factor 15.625 → 12.8x32 → 13x32
        assert_eq!((thumb.width(), thumb.height()), (13, 32));
    }

    #[test]
    fn small_source_is_not_upscaled() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("small.jpg");
        let output = tmp.path().join("thumb.jpg");
        create_test_jpeg(&source, 20, 10);

        let params = params_for(&source, &output, &ThumbnailConfig::default());
        assert!(matches!(
            RasterLibraryBackend::new().attempt(&params),
            BackendOutcome::Success
        ));
        let thumb = decode(&output);
        assert_eq!((thumb.width(), thumb.height()), (20, 10));
    }

    #[test]
    fn png_output_preserves_transparency() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.png");
        let output = tmp.path().join("thumb.png");
        create_half_transparent_png(&source, 128, 64);

        let config = ThumbnailConfig::default().with_target_format(TargetFormat::Png);
        let params = params_for(&source, &output, &config);
        assert!(matches!(
            RasterLibraryBackend::new().attempt(&params),
            BackendOutcome::Success
        ));

        let thumb = decode(&output).to_rgba8();
        assert_eq!(thumb.dimensions(), (32, 16));
        assert_eq!(thumb.get_pixel(31, 8)[3], 0, "right edge must stay transparent");
        assert_eq!(thumb.get_pixel(0, 8)[3], 255, "left edge must stay opaque");
    }

    #[test]
    fn jpeg_output_flattens_transparency_onto_white() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.png");
        let output = tmp.path().join("thumb.jpg");
        create_half_transparent_png(&source, 64, 64);

        let params = params_for(&source, &output, &ThumbnailConfig::default());
        assert!(matches!(
            RasterLibraryBackend::new().attempt(&params),
            BackendOutcome::Success
        ));

        let thumb = decode(&output).to_rgb8();
        let Rgb([r, g, b]) = *thumb.get_pixel(31, 16);
        assert!(r > 230 && g > 230 && b > 230, "expected white, got {r},{g},{b}");
    }

    #[test]
    fn gif_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        let output = tmp.path().join("thumb.gif");
        create_test_jpeg(&source, 64, 64);

        let config = ThumbnailConfig::default().with_target_format(TargetFormat::Gif);
        let params = params_for(&source, &output, &config);
        assert!(matches!(
            RasterLibraryBackend::new().attempt(&params),
            BackendOutcome::Success
        ));
        assert_eq!(image::guess_format(&std::fs::read(&output).unwrap()).unwrap(), ImageFormat::Gif);
    }

    #[test]
    fn pixel_budget_is_rejected_before_decode() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        let output = tmp.path().join("thumb.jpg");
        create_test_jpeg(&source, 101, 100);

        let config = ThumbnailConfig::default().with_source_limits(500_000, 10_100 - 1);
        let params = params_for(&source, &output, &config);
        assert!(matches!(
            RasterLibraryBackend::new().attempt(&params),
            BackendOutcome::Rejected(ThumbnailError::PixelBudgetExceeded {
                width: 101,
                height: 100,
                ..
            })
        ));
        assert!(!output.exists());
    }

    #[test]
    fn area_equal_to_budget_is_accepted() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        let output = tmp.path().join("thumb.jpg");
        create_test_jpeg(&source, 100, 100);

        let config = ThumbnailConfig::default().with_source_limits(500_000, 10_000);
        let params = params_for(&source, &output, &config);
        assert!(matches!(
            RasterLibraryBackend::new().attempt(&params),
            BackendOutcome::Success
        ));
    }

    #[test]
    fn wbmp_source_declines() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("icon.wbmp");
        let mut bytes = vec![0, 0, 8, 8];
        bytes.extend_from_slice(&[0u8; 8]);
        std::fs::write(&source, &bytes).unwrap();

        let params = params_for(&source, &tmp.path().join("t.jpg"), &ThumbnailConfig::default());
        assert_eq!(params.source.format, Some(SourceFormat::Wbmp));
        assert!(matches!(
            RasterLibraryBackend::new().attempt(&params),
            BackendOutcome::Declined(_)
        ));
    }

    #[test]
    fn unknown_source_declines() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("notes.txt");
        std::fs::write(&source, b"definitely not pixels").unwrap();

        let params = params_for(&source, &tmp.path().join("t.jpg"), &ThumbnailConfig::default());
        assert!(matches!(
            RasterLibraryBackend::new().attempt(&params),
            BackendOutcome::Declined(_)
        ));
    }

    #[test]
    fn corrupt_body_declines() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("broken.png");
        create_half_transparent_png(&source, 64, 64);
        // Keep the header, drop most of the pixel data
        let bytes = std::fs::read(&source).unwrap();
        std::fs::write(&source, &bytes[..40]).unwrap();

        let params = params_for(&source, &tmp.path().join("t.png"), &ThumbnailConfig::default());
        assert!(matches!(
            RasterLibraryBackend::new().attempt(&params),
            BackendOutcome::Declined(_)
        ));
    }

    #[test]
    fn extreme_aspect_keeps_one_pixel() {
        let canvas = compose_on_transparent(
            &DynamicImage::ImageRgba8(RgbaImage::from_pixel(500, 1, Rgba([0, 0, 255, 255]))),
            Dimensions {
                width: 32,
                height: 0,
            },
        );
        assert_eq!(canvas.dimensions(), (32, 1));
    }

    #[test]
    fn flatten_blends_partial_alpha() {
        let canvas = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128]));
        let flat = flatten_onto_white(&canvas);
        let Rgb([r, _, _]) = *flat.get_pixel(0, 0);
        assert!((125..=129).contains(&r), "got {r}");
    }
}
