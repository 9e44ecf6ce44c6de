//! # invoicer CLI
//!
//! Usage:
//!   invoicer invoice.json --snapshot preview.png
//!   cat invoice.json | invoicer --snapshot preview.png -o out.pdf
//!   invoicer invoice.json --totals
//!   invoicer --example > invoice.json

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::Parser;

use invoicer::layout::PaperSize;
use invoicer::options::{ExportOptions, ImageEncoding};
use invoicer::{Exporter, ImageSource, InvoiceData, InvoiceError, InvoiceTotals, PreviewDocument};

#[derive(Debug, Parser)]
#[command(name = "invoicer", version, about = "Export invoices and quotations to paginated PDF")]
struct Cli {
    /// Invoice JSON file. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Rendered preview image (PNG or JPEG path, data URI, or base64).
    #[arg(long)]
    snapshot: Option<String>,

    /// Output path. Defaults to `<type>-<number or draft>.pdf`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Export options as JSON; individual flags below override it.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Paper size: a4, a3, a5, letter, legal.
    #[arg(long, value_parser = parse_paper)]
    paper: Option<PaperSize>,

    #[arg(long)]
    zoom: Option<f64>,

    /// Top margin in millimetres.
    #[arg(long)]
    margin_top: Option<f64>,

    /// Bottom margin in millimetres.
    #[arg(long)]
    margin_bottom: Option<f64>,

    /// Store strips as JPEG with this quality instead of lossless Flate.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: Option<u8>,

    /// Print the totals as JSON and exit.
    #[arg(long)]
    totals: bool,

    /// Print the preview display values as JSON and exit.
    #[arg(long)]
    preview: bool,

    /// Print an example invoice JSON and exit.
    #[arg(long)]
    example: bool,
}

fn parse_paper(name: &str) -> Result<PaperSize, String> {
    PaperSize::from_name(name).ok_or_else(|| format!("unknown paper size '{}'", name))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if cli.example {
        print!("{}", example_invoice_json());
        return;
    }

    if let Err(e) = run(cli) {
        eprintln!("✗ {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), InvoiceError> {
    let input = match &cli.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let invoice: InvoiceData = serde_json::from_str(&input)?;

    if cli.totals {
        let totals = InvoiceTotals::compute(&invoice.items);
        println!("{}", serde_json::to_string_pretty(&totals)?);
        return Ok(());
    }
    if cli.preview {
        let preview = PreviewDocument::build(&invoice);
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    let snapshot = cli.snapshot.as_deref().ok_or_else(|| {
        InvoiceError::Capture("no snapshot given (use --snapshot <image>)".to_string())
    })?;
    let options = build_options(&cli)?;

    let mut exporter = Exporter::new(options);
    let document = exporter.export(&invoice, &ImageSource::from_src(snapshot))?;
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&document.filename));
    fs::write(&output_path, &document.bytes)?;
    eprintln!(
        "✓ Written {} page(s), {} bytes to {}",
        document.page_count,
        document.bytes.len(),
        output_path.display()
    );
    Ok(())
}

fn build_options(cli: &Cli) -> Result<ExportOptions, InvoiceError> {
    let mut options = match &cli.options {
        Some(path) => ExportOptions::from_json(&fs::read_to_string(path)?)?,
        None => ExportOptions::default(),
    };
    if let Some(paper) = cli.paper {
        options.paper = paper;
    }
    if let Some(zoom) = cli.zoom {
        options.zoom_factor = zoom;
    }
    if let Some(top) = cli.margin_top {
        options.top_margin = top;
    }
    if let Some(bottom) = cli.margin_bottom {
        options.bottom_margin = bottom;
    }
    if let Some(quality) = cli.jpeg_quality {
        options.encoding = ImageEncoding::Jpeg { quality };
    }
    options.geometry()?;
    Ok(options)
}

fn example_invoice_json() -> &'static str {
    r##"{
  "documentType": "invoice",
  "invoiceNumber": "INV-2026-001",
  "date": "2026-02-14",
  "dueDate": "2026-03-01",
  "currency": "USD",
  "company": {
    "name": "Acme Corp",
    "address": "123 Business St, Suite 100",
    "city": "San Francisco",
    "state": "CA",
    "zip": "94102",
    "phone": "+1 415 555 0100",
    "email": "billing@acme.example"
  },
  "client": {
    "name": "Widget Industries",
    "address": "456 Client Ave",
    "city": "New York",
    "state": "NY",
    "zip": "10001",
    "phone": "",
    "email": "ap@widget.example"
  },
  "items": [
    { "id": "1", "description": "Web Development Services", "quantity": 40, "price": 150.0, "tax": 8 },
    { "id": "2", "description": "UI/UX Design", "quantity": 20, "price": 175.0, "tax": 8 },
    { "id": "3", "description": "Server Infrastructure Setup", "quantity": 1, "price": 2500.0, "tax": 0 }
  ],
  "notes": "Thank you for your business.",
  "terms": "Payment is due within 15 days of the invoice date.",
  "taxRate": 8,
  "bankDetails": {
    "bankName": "First Example Bank",
    "accountName": "Acme Corp",
    "accountNumber": "000123456789",
    "routingCode": "021000021"
  },
  "paymentOptions": {
    "paypalEmail": "pay@acme.example"
  }
}
"##
}
