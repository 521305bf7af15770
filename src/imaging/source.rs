//! Source file probing.
//!
//! Reads only the file header: enough to tag the format and learn the
//! declared dimensions, without decoding pixels. Backends use the tag to decide
//! whether they can decode the file at all.

use super::backend::Dimensions;
use image::{ImageFormat, ImageReader};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Source formats the raster backend knows how to route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Gif,
    Jpeg,
    Png,
    /// Wireless bitmap. Detected so it can be declined explicitly; the
    /// `image` crate has no decoder for it.
    Wbmp,
}

/// Decoder lookup. `None` means no decoder exists in this build at all.
const DECODERS: &[(SourceFormat, Option<ImageFormat>)] = &[
    (SourceFormat::Gif, Some(ImageFormat::Gif)),
    (SourceFormat::Jpeg, Some(ImageFormat::Jpeg)),
    (SourceFormat::Png, Some(ImageFormat::Png)),
    (SourceFormat::Wbmp, None),
];

impl SourceFormat {
    pub fn name(self) -> &'static str {
        match self {
            SourceFormat::Gif => "GIF",
            SourceFormat::Jpeg => "JPEG",
            SourceFormat::Png => "PNG",
            SourceFormat::Wbmp => "WBMP",
        }
    }

    /// The `image` crate format used to decode this source, if any.
    pub fn image_format(self) -> Option<ImageFormat> {
        DECODERS
            .iter()
            .find(|(fmt, _)| *fmt == self)
            .and_then(|(_, image_format)| *image_format)
    }

    /// Whether a decoder for this format is compiled into the binary.
    ///
    /// Asked at runtime rather than assumed: `image` features decide which
    /// codecs exist.
    pub fn decoder_available(self) -> bool {
        self.image_format()
            .is_some_and(|format| format.reading_enabled())
    }

    fn from_image_format(format: ImageFormat) -> Option<Self> {
        DECODERS
            .iter()
            .find(|(_, image_format)| *image_format == Some(format))
            .map(|(fmt, _)| *fmt)
    }
}

/// What is known about a source file before any backend runs.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDescriptor {
    pub path: PathBuf,
    pub byte_size: u64,
    /// `None` when the header matches none of the known formats.
    pub format: Option<SourceFormat>,
    /// Dimensions declared by the header, `None` if they could not be read.
    pub dimensions: Option<Dimensions>,
}

impl SourceDescriptor {
    /// A descriptor with nothing probed yet.
    pub fn unprobed(path: &Path, byte_size: u64) -> Self {
        Self {
            path: path.to_path_buf(),
            byte_size,
            format: None,
            dimensions: None,
        }
    }
}

/// Probe the header of `path`. Never fails: anything unreadable is left as
/// `None` for the backends to decline on.
pub fn probe(path: &Path, byte_size: u64) -> SourceDescriptor {
    let mut descriptor = SourceDescriptor::unprobed(path, byte_size);

    let mut header = Vec::with_capacity(64);
    let read = File::open(path).and_then(|f| f.take(64).read_to_end(&mut header));
    if read.is_err() {
        return descriptor;
    }

    if let Some(format) = image::guess_format(&header)
        .ok()
        .and_then(SourceFormat::from_image_format)
    {
        descriptor.format = Some(format);
        if format.decoder_available() {
            descriptor.dimensions = read_header_dimensions(path, format);
        }
    } else if let Some(dims) = sniff_wbmp(&header, byte_size) {
        descriptor.format = Some(SourceFormat::Wbmp);
        descriptor.dimensions = Some(dims);
    }

    descriptor
}

fn read_header_dimensions(path: &Path, format: SourceFormat) -> Option<Dimensions> {
    let mut reader = ImageReader::open(path).ok()?;
    reader.set_format(format.image_format()?);
    let (width, height) = reader.into_dimensions().ok()?;
    Some(Dimensions { width, height })
}

/// Recognise a WBMP type 0 header: two zero bytes then width and height as
/// multi-byte integers. WBMP has no magic number, so the declared size must
/// also be consistent with the file length.
fn sniff_wbmp(header: &[u8], byte_size: u64) -> Option<Dimensions> {
    let (&type_field, rest) = header.split_first()?;
    let (&fix_header, rest) = rest.split_first()?;
    if type_field != 0 || fix_header != 0 {
        return None;
    }
    let (width, rest) = read_multibyte(rest)?;
    let (height, rest) = read_multibyte(rest)?;
    if width == 0 || height == 0 {
        return None;
    }

    let header_len = (header.len() - rest.len()) as u64;
    let row_bytes = (width as u64).div_ceil(8);
    if header_len + row_bytes * height as u64 > byte_size {
        return None;
    }
    Some(Dimensions { width, height })
}

/// WBMP multi-byte integer: 7 bits per byte, high bit set on all but the last.
fn read_multibyte(bytes: &[u8]) -> Option<(u32, &[u8])> {
    let mut value: u32 = 0;
    for (i, &byte) in bytes.iter().enumerate().take(4) {
        value = (value << 7) | (byte & 0x7f) as u32;
        if byte & 0x80 == 0 {
            return Some((value, &bytes[i + 1..]));
        }
    }
    None
}
