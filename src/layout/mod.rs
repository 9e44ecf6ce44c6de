//! # Pagination
//!
//! Slices one tall snapshot into page-sized strips.
//!
//! The snapshot is scaled to `page width * zoom`, keeping its aspect ratio,
//! and then cut into strips no taller than the page's content area. Each
//! strip becomes one page: centered horizontally, starting at the top
//! margin. Strips are contiguous and in source order, so stacking the pages
//! gives back every source row exactly once.
//!
//! Page boundaries fall on whole source rows, but every page except the
//! last is drawn exactly one content height tall. A page's vertical scale
//! can therefore differ from the snapshot's by up to one row's height.
//!
//! All lengths here are millimetres, measured from the top-left corner of
//! the page. The PDF writer converts to points and flips the y axis.

pub mod page_break;

use serde::{Deserialize, Serialize};

use crate::error::{InvoiceError, Result};
use page_break::{to_mm, to_units, RowScale};

/// Largest page, margin or rendered snapshot length accepted, in
/// millimetres. Keeps the fixed-point row arithmetic within `u128`.
pub const MAX_LENGTH_MM: f64 = 1_000_000.0;

/// Standard paper sizes in millimetres (portrait).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PaperSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PaperSize {
    /// Returns (width, height) in millimetres.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Custom { width, height } => (*width, *height),
        }
    }

    /// Parse a case-insensitive name such as `a4` or `letter`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "a4" => Some(PaperSize::A4),
            "a3" => Some(PaperSize::A3),
            "a5" => Some(PaperSize::A5),
            "letter" => Some(PaperSize::Letter),
            "legal" => Some(PaperSize::Legal),
            _ => None,
        }
    }
}

/// Physical page layout for one export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: f64,
    pub page_height: f64,
    pub top_margin: f64,
    pub bottom_margin: f64,
    /// Magnification of the snapshot relative to the page width.
    pub zoom_factor: f64,
}

impl PageGeometry {
    pub fn new(paper: PaperSize, top_margin: f64, bottom_margin: f64, zoom_factor: f64) -> Result<Self> {
        let (page_width, page_height) = paper.dimensions();
        let geometry = Self {
            page_width,
            page_height,
            top_margin,
            bottom_margin,
            zoom_factor,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Height available for content between the margins.
    pub fn content_height(&self) -> f64 {
        self.page_height - self.top_margin - self.bottom_margin
    }

    /// Rendered width of the snapshot on the page.
    pub fn image_width(&self) -> f64 {
        self.page_width * self.zoom_factor
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0 && v <= MAX_LENGTH_MM;
        let non_negative = |v: f64| v.is_finite() && v >= 0.0 && v <= MAX_LENGTH_MM;
        if !positive(self.page_width) || !positive(self.page_height) {
            return Err(InvoiceError::Geometry(format!(
                "page size must be positive and at most {} mm, got {} x {} mm",
                MAX_LENGTH_MM, self.page_width, self.page_height
            )));
        }
        if !non_negative(self.top_margin) || !non_negative(self.bottom_margin) {
            return Err(InvoiceError::Geometry(
                "margins must be finite and non-negative".to_string(),
            ));
        }
        if !positive(self.content_height()) {
            return Err(InvoiceError::Geometry(format!(
                "margins ({} + {} mm) leave no room on a {} mm page",
                self.top_margin, self.bottom_margin, self.page_height
            )));
        }
        if !(self.zoom_factor.is_finite() && self.zoom_factor > 0.0) {
            return Err(InvoiceError::Geometry(format!(
                "zoom factor must be positive, got {}",
                self.zoom_factor
            )));
        }
        if !positive(self.image_width()) {
            return Err(InvoiceError::Geometry(format!(
                "zoom {} renders the snapshot {} mm wide, above the {} mm limit",
                self.zoom_factor,
                self.image_width(),
                MAX_LENGTH_MM
            )));
        }
        Ok(())
    }
}

/// A horizontal slice of the snapshot placed on one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strip {
    /// First source pixel row.
    pub source_top: u32,
    /// Number of source pixel rows.
    pub source_rows: u32,
    /// Placement on the page, from the top-left corner. `x` is negative
    /// when the zoomed snapshot is wider than the page.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Strip {
    /// One past the last source row.
    pub fn source_bottom(&self) -> u32 {
        self.source_top + self.source_rows
    }
}

/// One output page.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    pub strip: Strip,
}

/// Split a `width_px` x `height_px` snapshot into pages.
///
/// Fails if the geometry is invalid, the bitmap is empty, or a single page
/// would hold less than one source row.
pub fn paginate(width_px: u32, height_px: u32, geometry: &PageGeometry) -> Result<Vec<LayoutPage>> {
    geometry.validate()?;
    if width_px == 0 || height_px == 0 {
        return Err(InvoiceError::Capture(format!(
            "cannot paginate an empty snapshot ({}x{} px)",
            width_px, height_px
        )));
    }

    let image_width = geometry.image_width();
    let image_height = height_px as f64 * image_width / width_px as f64;
    let content_height = geometry.content_height();

    let scale = RowScale::new(width_px, to_units(image_width));
    let content_units = to_units(content_height);
    if !scale.holds_a_row(content_units) {
        return Err(InvoiceError::Geometry(format!(
            "a {:.3} mm content area is shorter than one snapshot row ({:.3} mm)",
            content_height,
            image_width / width_px as f64
        )));
    }

    let page_count = scale.page_count(height_px, content_units);
    let x = (geometry.page_width - image_width) / 2.0;
    log::debug!(
        "paginating {}x{} px snapshot: {:.2} x {:.2} mm rendered, {:.2} mm per page, {} page(s)",
        width_px,
        height_px,
        image_width,
        image_height,
        content_height,
        page_count
    );

    let mut pages = Vec::with_capacity(page_count);
    for index in 0..page_count {
        let top = scale.row_boundary(index, content_units, height_px);
        let bottom = scale.row_boundary(index + 1, content_units, height_px);
        let is_last = index + 1 == page_count;
        // Full pages fill the content area even though their rows were
        // rounded to whole pixels.
        let height = if is_last {
            // Fixed-point rounding may overshoot the content height by a
            // fraction of a nanometre.
            to_mm(scale.last_page_extent(height_px, page_count, content_units)).min(content_height)
        } else {
            content_height
        };
        pages.push(LayoutPage {
            width: geometry.page_width,
            height: geometry.page_height,
            strip: Strip {
                source_top: top,
                source_rows: bottom - top,
                x,
                y: geometry.top_margin,
                width: image_width,
                height,
            },
        });
    }

    Ok(pages)
}
