//! # invoicer
//!
//! Invoice and quotation totals, and export of the rendered document to a
//! paginated, image-based PDF.
//!
//! The document is rendered elsewhere (a browser preview, a template engine)
//! into one tall bitmap. This crate computes the numbers that rendering
//! shows and turns the bitmap into pages: it is scaled to the page width,
//! cut into strips the height of the page's content area, and each strip is
//! placed on its own page between fixed top and bottom margins.
//!
//! ## Architecture
//!
//! ```text
//! InvoiceData (JSON / commands)
//!       ↓
//!   [ledger]    : subtotal, tax, total
//!       ↓
//!   [preview]   : display strings for the preview renderer
//!       ↓
//!   [snapshot]  : bitmap of the rendered document
//!       ↓
//!   [layout]    : slice into page strips
//!       ↓
//!   [pdf]       : serialize to PDF bytes
//! ```

pub mod error;
pub mod layout;
pub mod ledger;
pub mod model;
pub mod options;
pub mod pdf;
pub mod preview;
pub mod snapshot;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{InvoiceError, Result};
pub use ledger::InvoiceTotals;
pub use model::{InvoiceCommand, InvoiceData, LineItem};
pub use options::ExportOptions;
pub use preview::PreviewDocument;
pub use snapshot::{ImageSource, Snapshot, SnapshotSource};

use layout::paginate;
use pdf::{Metadata, PdfWriter};

/// A finished export: the file to offer for download.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedDocument {
    /// `<documentType>-<invoiceNumber or "draft">.pdf`
    pub filename: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Runs exports one at a time and remembers the last one that succeeded.
///
/// `export` takes `&mut self`, so a second export can't start while one is
/// in flight. A failed export leaves the previous result in place.
#[derive(Debug, Default)]
pub struct Exporter {
    options: ExportOptions,
    last: Option<ExportedDocument>,
}

impl Exporter {
    pub fn new(options: ExportOptions) -> Self {
        Self { options, last: None }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// The most recent successful export.
    pub fn last_export(&self) -> Option<&ExportedDocument> {
        self.last.as_ref()
    }

    /// Capture the snapshot, paginate it and write the PDF.
    ///
    /// Capture and encoding failures are logged here and returned; no
    /// partial document is produced.
    pub fn export<S>(&mut self, invoice: &InvoiceData, source: &S) -> Result<&ExportedDocument>
    where
        S: SnapshotSource + ?Sized,
    {
        let filename = invoice.export_filename();
        match render(invoice, source, &self.options) {
            Ok((bytes, page_count)) => {
                log::info!(
                    "exported {} ({} page(s), {} bytes)",
                    filename,
                    page_count,
                    bytes.len()
                );
                Ok(&*self.last.insert(ExportedDocument {
                    filename,
                    bytes,
                    page_count,
                }))
            }
            Err(e) => {
                log::error!("failed to export {}: {}", filename, e);
                Err(e)
            }
        }
    }
}

/// Export a document with the given options.
pub fn export<S>(invoice: &InvoiceData, source: &S, options: &ExportOptions) -> Result<ExportedDocument>
where
    S: SnapshotSource + ?Sized,
{
    let mut exporter = Exporter::new(options.clone());
    exporter.export(invoice, source)?;
    exporter
        .last
        .ok_or_else(|| InvoiceError::Encoding("export produced no document".to_string()))
}

/// Export invoice data described as JSON.
pub fn export_json<S>(json: &str, source: &S, options: &ExportOptions) -> Result<ExportedDocument>
where
    S: SnapshotSource + ?Sized,
{
    let invoice: InvoiceData = serde_json::from_str(json)?;
    export(&invoice, source, options)
}

/// Totals of invoice data described as JSON.
pub fn totals_json(json: &str) -> Result<InvoiceTotals> {
    let invoice: InvoiceData = serde_json::from_str(json)?;
    Ok(InvoiceTotals::compute(&invoice.items))
}

fn render<S>(invoice: &InvoiceData, source: &S, options: &ExportOptions) -> Result<(Vec<u8>, usize)>
where
    S: SnapshotSource + ?Sized,
{
    let geometry = options.geometry()?;
    let snapshot = source.capture()?;
    let pages = paginate(snapshot.width(), snapshot.height(), &geometry)?;
    let writer = PdfWriter::new(options.encoding);
    let bytes = writer.write(&pages, &snapshot, &Metadata::from_invoice(invoice))?;
    Ok((bytes, pages.len()))
}
