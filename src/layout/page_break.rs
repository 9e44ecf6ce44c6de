//! # Page Break Arithmetic
//!
//! Where each page starts in the snapshot, in whole source rows.
//!
//! Physical lengths are converted to integer nanometres once, and every
//! boundary is computed directly from its page index. Nothing is
//! accumulated, so a fifty-page export lands on the same rows as fifty
//! single-page computations would.

/// Fixed-point resolution: one unit is a nanometre.
pub const UNITS_PER_MM: f64 = 1_000_000.0;

/// Convert millimetres to fixed-point units. Callers validate that the
/// length is finite and positive.
pub fn to_units(mm: f64) -> u128 {
    (mm * UNITS_PER_MM).round() as u128
}

pub fn to_mm(units: f64) -> f64 {
    units / UNITS_PER_MM
}

/// The ratio between source rows and rendered length: a snapshot `width_px`
/// wide rendered `image_width` units wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowScale {
    pub width_px: u128,
    pub image_width: u128,
}

impl RowScale {
    pub fn new(width_px: u32, image_width: u128) -> Self {
        Self {
            width_px: width_px as u128,
            image_width,
        }
    }

    /// Number of pages needed for `height_px` rows when each page shows
    /// `content_height` units: `ceil(rendered height / content height)`.
    pub fn page_count(&self, height_px: u32, content_height: u128) -> usize {
        let rendered = height_px as u128 * self.image_width;
        let per_page = self.width_px * content_height;
        if rendered == 0 {
            return 1;
        }
        ((rendered + per_page - 1) / per_page) as usize
    }

    /// Whether a page of `content_height` units covers at least one row.
    pub fn holds_a_row(&self, content_height: u128) -> bool {
        self.width_px * content_height >= self.image_width
    }

    /// First source row of page `index`, rounded down and clamped to the
    /// bitmap height.
    pub fn row_boundary(&self, index: usize, content_height: u128, height_px: u32) -> u32 {
        let exact_numer = index as u128 * content_height * self.width_px;
        let row = exact_numer / self.image_width;
        row.min(height_px as u128) as u32
    }

    /// Rendered length of the final page, in units, as an exact quotient.
    pub fn last_page_extent(&self, height_px: u32, pages: usize, content_height: u128) -> f64 {
        let rendered_numer = height_px as u128 * self.image_width;
        let before = (pages as u128 - 1) * content_height * self.width_px;
        rendered_numer.saturating_sub(before) as f64 / self.width_px as f64
    }
}
