//! Export configuration.
//!
//! Every field has a default, so `{}` is a valid options document and the
//! CLI only overrides what it was given.

use serde::{Deserialize, Serialize};

use crate::error::{InvoiceError, Result};
use crate::layout::{PageGeometry, PaperSize};

/// How strip pixels are stored in the PDF.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ImageEncoding {
    /// Lossless RGB with FlateDecode, plus an SMask when a strip has
    /// transparency.
    #[default]
    Flate,
    /// JPEG (DCTDecode). Smaller files, no transparency.
    Jpeg {
        #[serde(default = "default_jpeg_quality")]
        quality: u8,
    },
}

fn default_jpeg_quality() -> u8 {
    85
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    #[serde(default)]
    pub paper: PaperSize,

    /// Millimetres kept blank above the strip on every page.
    #[serde(default = "default_margin")]
    pub top_margin: f64,

    #[serde(default = "default_margin")]
    pub bottom_margin: f64,

    /// Snapshot width relative to the page width.
    #[serde(default = "default_zoom")]
    pub zoom_factor: f64,

    #[serde(default)]
    pub encoding: ImageEncoding,
}

fn default_margin() -> f64 {
    10.0
}

fn default_zoom() -> f64 {
    1.1
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            paper: PaperSize::A4,
            top_margin: default_margin(),
            bottom_margin: default_margin(),
            zoom_factor: default_zoom(),
            encoding: ImageEncoding::Flate,
        }
    }
}

impl ExportOptions {
    /// Parse options from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: ExportOptions = serde_json::from_str(json)?;
        options.geometry()?;
        Ok(options)
    }

    /// Validated page geometry for these options.
    pub fn geometry(&self) -> Result<PageGeometry> {
        if let ImageEncoding::Jpeg { quality } = self.encoding {
            if !(1..=100).contains(&quality) {
                return Err(InvoiceError::Geometry(format!(
                    "JPEG quality must be within 1..=100, got {}",
                    quality
                )));
            }
        }
        PageGeometry::new(self.paper, self.top_margin, self.bottom_margin, self.zoom_factor)
    }
}
