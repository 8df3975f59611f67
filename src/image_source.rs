//! Decoding of the image file into an in-memory RGBA buffer.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::{ColorType, ImageReader, RgbaImage, imageops};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::geometry::Size;

/// Decoded image, read-only for the lifetime of the viewport.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    format: ColorType,
    pixels: RgbaImage,
}

impl ImageBuffer {
    /// Wraps already-decoded RGBA pixels; `format` records what the source file held.
    pub fn new(pixels: RgbaImage, format: ColorType) -> Self {
        Self { format, pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Pixel format of the file before conversion to RGBA8.
    pub fn format(&self) -> ColorType {
        self.format
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Decodes `path`, converts it to RGBA8 and applies its EXIF orientation.
pub fn load(path: &Path) -> Result<ImageBuffer> {
    let open_err = |source| Error::Open {
        path: path.to_path_buf(),
        source,
    };
    let decoded = ImageReader::open(path)
        .map_err(open_err)?
        .with_guessed_format() // sniff content, the extension may lie
        .map_err(open_err)?
        .decode()
        .map_err(|source| Error::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    let format = decoded.color();
    let mut pixels = decoded.to_rgba8();
    if let Some(orientation) = read_orientation(path) {
        pixels = apply_orientation(pixels, orientation);
    }

    let image = ImageBuffer::new(pixels, format);
    info!(
        path = %path.display(),
        size = %image.size(),
        format = ?format,
        "loaded image"
    );
    Ok(image)
}

fn read_orientation(path: &Path) -> Option<u32> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let orientation = field.value.get_uint(0)?;
    debug!(orientation, path = %path.display(), "exif orientation");
    Some(orientation)
}

/// Maps an EXIF orientation tag onto the pixel data. Unknown values pass through.
pub fn apply_orientation(pixels: RgbaImage, orientation: u32) -> RgbaImage {
    match orientation {
        2 => imageops::flip_horizontal(&pixels),
        3 => imageops::rotate180(&pixels),
        4 => imageops::flip_vertical(&pixels),
        5 => imageops::flip_horizontal(&imageops::rotate90(&pixels)),
        6 => imageops::rotate90(&pixels),
        7 => imageops::flip_horizontal(&imageops::rotate270(&pixels)),
        8 => imageops::rotate270(&pixels),
        _ => pixels,
    }
}
