//! # Snapshot Capture
//!
//! The snapshot is a bitmap of the whole rendered document, the only input
//! to pagination. Producing it (laying out and rasterizing the preview) is
//! the preview renderer's job; this module defines the seam and the sources
//! that hand an already-rendered bitmap to the exporter.
//!
//! Every failure here is a capture error: the export stops before any page
//! is produced.

use std::io::Cursor;

use image::{DynamicImage, RgbaImage};

use crate::error::{InvoiceError, Result};

/// A captured bitmap, owned by one export call.
#[derive(Debug, Clone)]
pub struct Snapshot {
    image: RgbaImage,
}

impl Snapshot {
    /// Wrap a bitmap. Zero-sized bitmaps are rejected.
    pub fn new(image: RgbaImage) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(InvoiceError::Capture(format!(
                "snapshot is empty ({}x{} px)",
                image.width(),
                image.height()
            )));
        }
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Anything that can produce the document bitmap on demand.
pub trait SnapshotSource {
    fn capture(&self) -> Result<Snapshot>;
}

impl SnapshotSource for RgbaImage {
    fn capture(&self) -> Result<Snapshot> {
        Snapshot::new(self.clone())
    }
}

impl SnapshotSource for DynamicImage {
    fn capture(&self) -> Result<Snapshot> {
        Snapshot::new(self.to_rgba8())
    }
}

impl SnapshotSource for Snapshot {
    fn capture(&self) -> Result<Snapshot> {
        Ok(self.clone())
    }
}

/// An encoded PNG or JPEG snapshot.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// `data:image/...;base64,...`, an explicit file path
    /// (`/`, `./` or `../`), or raw base64.
    Src(String),
    /// Encoded bytes already in memory.
    Bytes(Vec<u8>),
}

impl ImageSource {
    pub fn from_src(src: impl Into<String>) -> Self {
        ImageSource::Src(src.into())
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        ImageSource::Bytes(bytes.into())
    }
}

impl SnapshotSource for ImageSource {
    fn capture(&self) -> Result<Snapshot> {
        let image = match self {
            ImageSource::Src(src) => decode_image_bytes(&read_source_bytes(src)?)?,
            ImageSource::Bytes(bytes) => decode_image_bytes(bytes)?,
        };
        log::debug!("captured snapshot {}x{} px", image.width(), image.height());
        Snapshot::new(image)
    }
}

/// Resolve the source string to raw image bytes.
fn read_source_bytes(src: &str) -> Result<Vec<u8>> {
    if src.starts_with("data:image/") {
        let comma_pos = src
            .find(',')
            .ok_or_else(|| InvoiceError::Capture("invalid data URI: missing comma".to_string()))?;
        return base64_decode(&src[comma_pos + 1..]);
    }

    // Only explicit path prefixes count as paths; base64 contains '/' too.
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        #[cfg(not(target_arch = "wasm32"))]
        {
            return std::fs::read(src).map_err(|e| {
                InvoiceError::Capture(format!("failed to read snapshot '{}': {}", src, e))
            });
        }
        #[cfg(target_arch = "wasm32")]
        {
            return Err(InvoiceError::Capture(format!(
                "file paths are not available in WASM: '{}'",
                src
            )));
        }
    }

    base64_decode(src)
}

fn base64_decode(input: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| InvoiceError::Capture(format!("base64 decode error: {}", e)))
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
}

/// Detect the format from magic bytes and decode to RGBA.
fn decode_image_bytes(data: &[u8]) -> Result<RgbaImage> {
    if data.len() < 4 {
        return Err(InvoiceError::Capture("image data too short".to_string()));
    }
    let format = if is_png(data) {
        image::ImageFormat::Png
    } else if is_jpeg(data) {
        image::ImageFormat::Jpeg
    } else {
        return Err(InvoiceError::Capture(
            "unsupported image format (expected PNG or JPEG)".to_string(),
        ));
    };

    let img = image::load(Cursor::new(data), format)
        .map_err(|e| InvoiceError::Capture(format!("failed to decode snapshot: {}", e)))?;
    Ok(img.to_rgba8())
}
