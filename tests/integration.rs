//! Integration tests for the export pipeline.
//!
//! These exercise the full path from invoice JSON and a snapshot bitmap to
//! PDF bytes. They verify:
//! - totals for the documented scenarios
//! - page counts and strip coverage for tall snapshots
//! - capture failures produce nothing and keep the previous export
//! - the download file name

use image::{Rgba, RgbaImage};

use invoicer::layout::{paginate, PageGeometry, PaperSize};
use invoicer::model::{InvoiceCommand, ItemField};
use invoicer::options::{ExportOptions, ImageEncoding};
use invoicer::{
    export, export_json, totals_json, Exporter, ImageSource, InvoiceData, InvoiceError,
    InvoiceTotals, LineItem, PreviewDocument,
};

// ─── Helpers ────────────────────────────────────────────────────

fn item(id: &str, quantity: u32, price: f64, tax: f64) -> LineItem {
    LineItem {
        quantity,
        price,
        tax,
        ..LineItem::new(id)
    }
}

/// A snapshot where every row has a distinct color, so strips can be
/// checked against their source rows.
fn striped_snapshot(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |_, y| {
        Rgba([(y % 256) as u8, (y / 256 % 256) as u8, 7, 255])
    })
}

/// 200 x 120 mm page, 10 mm margins, no zoom: 100 mm of content.
fn test_options() -> ExportOptions {
    ExportOptions {
        paper: PaperSize::Custom {
            width: 200.0,
            height: 120.0,
        },
        top_margin: 10.0,
        bottom_margin: 10.0,
        zoom_factor: 1.0,
        encoding: ImageEncoding::Flate,
    }
}

fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

fn sample_invoice() -> InvoiceData {
    InvoiceData {
        invoice_number: "INV-100".to_string(),
        items: vec![item("a", 2, 10.0, 10.0), item("b", 1, 5.0, 0.0)],
        ..InvoiceData::default()
    }
}

// ─── Ledger ─────────────────────────────────────────────────────

#[test]
fn scenario_totals() {
    let totals = InvoiceTotals::compute(&sample_invoice().items);
    assert!((totals.subtotal - 25.0).abs() < 1e-9);
    assert!((totals.tax_total - 2.0).abs() < 1e-9);
    assert!((totals.grand_total - 27.0).abs() < 1e-9);
}

#[test]
fn totals_from_json_coerce_bad_fields() {
    let json = r#"{
        "items": [
            { "id": "1", "quantity": "", "price": "12.5", "tax": "abc" },
            { "id": "2", "quantity": 3, "price": 2 }
        ]
    }"#;
    let totals = totals_json(json).unwrap();
    assert!((totals.subtotal - 18.5).abs() < 1e-9);
    assert_eq!(totals.tax_total, 0.0);
}

#[test]
fn commands_feed_the_ledger() {
    let data = InvoiceData {
        items: vec![],
        ..InvoiceData::default()
    }
    .apply_all([
        InvoiceCommand::SetDefaultTaxRate(10.0),
        InvoiceCommand::AddItem,
        InvoiceCommand::UpdateItem {
            id: "item-1".into(),
            field: ItemField::Quantity(2),
        },
        InvoiceCommand::UpdateItem {
            id: "item-1".into(),
            field: ItemField::Price(10.0),
        },
        InvoiceCommand::AddItem,
        InvoiceCommand::UpdateItem {
            id: "item-2".into(),
            field: ItemField::Price(5.0),
        },
        InvoiceCommand::UpdateItem {
            id: "item-2".into(),
            field: ItemField::Tax(0.0),
        },
    ]);
    let preview = PreviewDocument::build(&data);
    assert_eq!(preview.subtotal, "$25.00");
    assert_eq!(preview.tax, "$2.00");
    assert_eq!(preview.total, "$27.00");
}

// ─── Pagination ─────────────────────────────────────────────────

#[test]
fn short_snapshot_is_one_page() {
    let doc = export(&sample_invoice(), &striped_snapshot(100, 40), &test_options()).unwrap();
    assert_eq!(doc.page_count, 1);
    assert_eq!(count(&doc.bytes, b"/Type /Page "), 1);
}

#[test]
fn two_and_a_half_pages_reconstruct_the_image() {
    let options = test_options();
    let geometry = options.geometry().unwrap();
    let content = geometry.content_height();
    // 125 rows at 2 mm per row = 250 mm = 2.5 content heights
    let pages = paginate(100, 125, &geometry).unwrap();
    assert_eq!(pages.len(), 3);

    let heights: Vec<f64> = pages.iter().map(|p| p.strip.height).collect();
    assert!((heights[0] - content).abs() < 1e-9);
    assert!((heights[1] - content).abs() < 1e-9);
    assert!((heights[2] - 0.5 * content).abs() < 1e-9);
    assert!((heights.iter().sum::<f64>() - 2.5 * content).abs() < 1e-9);

    let mut next_row = 0;
    for page in &pages {
        assert_eq!(page.strip.source_top, next_row, "gap or overlap between strips");
        next_row = page.strip.source_bottom();
    }
    assert_eq!(next_row, 125);

    let doc = export(&sample_invoice(), &striped_snapshot(100, 125), &options).unwrap();
    assert_eq!(doc.page_count, 3);
    assert_eq!(count(&doc.bytes, b"/Subtype /Image"), 3);
}

#[test]
fn every_page_respects_margins() {
    let options = ExportOptions {
        top_margin: 15.0,
        bottom_margin: 25.0,
        ..ExportOptions::default()
    };
    let geometry = options.geometry().unwrap();
    let pages = paginate(1240, 9000, &geometry).unwrap();
    assert!(pages.len() > 1);
    for page in &pages {
        assert_eq!(page.strip.y, 15.0);
        assert!(page.strip.y + page.strip.height <= page.height - 25.0 + 1e-9);
        assert!((page.strip.x * 2.0 + page.strip.width - page.width).abs() < 1e-9);
    }
}

// ─── Export boundary ────────────────────────────────────────────

#[test]
fn export_json_names_the_file() {
    let json = r#"{ "documentType": "quotation", "invoiceNumber": "Q-12", "items": [] }"#;
    let doc = export_json(json, &striped_snapshot(50, 50), &test_options()).unwrap();
    assert_eq!(doc.filename, "quotation-Q-12.pdf");
    assert!(doc.bytes.starts_with(b"%PDF-1.7"));
}

#[test]
fn draft_filename_without_number() {
    let data = InvoiceData::default();
    let doc = export(&data, &striped_snapshot(10, 10), &test_options()).unwrap();
    assert_eq!(doc.filename, "invoice-draft.pdf");
}

#[test]
fn capture_failure_keeps_previous_export() {
    let mut exporter = Exporter::new(test_options());
    exporter
        .export(&sample_invoice(), &striped_snapshot(100, 40))
        .unwrap();
    let before = exporter.last_export().cloned().unwrap();

    let missing = ImageSource::from_src("./no/such/preview.png");
    let err = exporter.export(&sample_invoice(), &missing).unwrap_err();
    assert!(matches!(err, InvoiceError::Capture(_)));
    assert!(err.is_export_failure());
    assert_eq!(exporter.last_export(), Some(&before));
}

#[test]
fn encoding_failure_keeps_previous_export() {
    let mut exporter = Exporter::new(ExportOptions {
        encoding: ImageEncoding::Jpeg { quality: 80 },
        ..test_options()
    });
    exporter
        .export(&sample_invoice(), &striped_snapshot(100, 40))
        .unwrap();
    let before = exporter.last_export().cloned().unwrap();

    // JPEG can't store an image wider than 65535 px
    let too_wide = striped_snapshot(65_536, 1);
    let err = exporter.export(&sample_invoice(), &too_wide).unwrap_err();
    assert!(matches!(err, InvoiceError::Encoding(_)));
    assert!(err.is_export_failure());
    assert_eq!(exporter.last_export(), Some(&before));
}

#[test]
fn empty_snapshot_is_capture_error() {
    let err = export(&sample_invoice(), &RgbaImage::new(0, 0), &test_options()).unwrap_err();
    assert!(matches!(err, InvoiceError::Capture(_)));
}

#[test]
fn invalid_json_reports_hint() {
    let err = export_json("{ \"items\": [ }", &striped_snapshot(1, 1), &test_options()).unwrap_err();
    match err {
        InvoiceError::Parse { hint, .. } => assert!(!hint.is_empty()),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn encoded_png_snapshot_round_trips_through_export() {
    let img = striped_snapshot(20, 300);
    let mut png = Vec::new();
    image::ImageEncoder::write_image(
        image::codecs::png::PngEncoder::new(&mut png),
        img.as_raw(),
        20,
        300,
        image::ColorType::Rgba8,
    )
    .unwrap();

    // 20 px across 200 mm: 10 mm per row, 10 rows per page
    let doc = export(&sample_invoice(), &ImageSource::from_bytes(png), &test_options()).unwrap();
    assert_eq!(doc.page_count, 30);
}

#[test]
fn metadata_carries_company_and_title() {
    let data = sample_invoice().apply(InvoiceCommand::UpdateCompany(
        invoicer::model::PartyField::Name,
        "Acme Corp".into(),
    ));
    let doc = export(&data, &striped_snapshot(10, 10), &test_options()).unwrap();
    let text = String::from_utf8_lossy(&doc.bytes);
    assert!(text.contains("/Title (Invoice #INV-100)"));
    assert!(text.contains("/Author (Acme Corp)"));
}

#[test]
fn default_geometry_is_a4() {
    let g = PageGeometry::new(PaperSize::A4, 10.0, 10.0, 1.1).unwrap();
    assert_eq!(ExportOptions::default().geometry().unwrap(), g);
}
