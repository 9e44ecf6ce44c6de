//! # PDF Serializer
//!
//! Writes paginated snapshot strips as a PDF file.
//!
//! This is a from-scratch PDF 1.7 writer. Every page carries exactly one
//! image XObject, its strip of the snapshot, drawn with a single `cm`
//! transform. That keeps the subset of the format we need small enough to
//! write by hand.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- catalog, page tree, images, content streams, pages
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Layout coordinates are millimetres from the top-left corner; PDF user
//! space is points from the bottom-left. `to_pt` and the y flip in
//! `build_content_stream` are the only places the two meet.

use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use image::RgbaImage;
use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::{InvoiceError, Result};
use crate::layout::{LayoutPage, Strip};
use crate::model::InvoiceData;
use crate::options::ImageEncoding;
use crate::snapshot::Snapshot;

const MM_TO_PT: f64 = 72.0 / 25.4;

fn to_pt(mm: f64) -> f64 {
    mm * MM_TO_PT
}

/// Document information written to the Info dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

impl Metadata {
    /// Title from the document type and number, author from the company.
    pub fn from_invoice(data: &InvoiceData) -> Self {
        let author = data.company.name.trim();
        let client = data.client.name.trim();
        Self {
            title: Some(data.title()),
            author: (!author.is_empty()).then(|| author.to_string()),
            subject: (!client.is_empty())
                .then(|| format!("{} for {}", data.document_type.label(), client)),
        }
    }
}

pub struct PdfWriter {
    encoding: ImageEncoding,
}

struct PdfObject {
    data: Vec<u8>,
}

/// Tracks allocated PDF objects during writing. Object IDs are indices
/// into `objects`; index 0 is the unused free-list head.
struct PdfBuilder {
    objects: Vec<PdfObject>,
}

impl PdfBuilder {
    fn new() -> Self {
        let mut objects = Vec::new();
        // 0 = placeholder (PDF objects are 1-indexed), 1 = Catalog, 2 = Pages
        for _ in 0..3 {
            objects.push(PdfObject { data: vec![] });
        }
        Self { objects }
    }

    fn push(&mut self, data: Vec<u8>) -> usize {
        let id = self.objects.len();
        self.objects.push(PdfObject { data });
        id
    }

    fn push_stream(&mut self, dict_entries: &str, payload: &[u8]) -> usize {
        let mut data: Vec<u8> = Vec::new();
        let _ = write!(data, "<< {} /Length {} >>\nstream\n", dict_entries, payload.len());
        data.extend_from_slice(payload);
        data.extend_from_slice(b"\nendstream");
        self.push(data)
    }
}

/// Strip pixels split the way PDF wants them.
struct StripPixels {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
    /// None if fully opaque.
    alpha: Option<Vec<u8>>,
}

impl PdfWriter {
    pub fn new(encoding: ImageEncoding) -> Self {
        Self { encoding }
    }

    /// Write one page per layout page, each showing its strip of `snapshot`.
    pub fn write(&self, pages: &[LayoutPage], snapshot: &Snapshot, metadata: &Metadata) -> Result<Vec<u8>> {
        if pages.is_empty() {
            return Err(InvoiceError::Encoding("no pages to write".to_string()));
        }

        let mut builder = PdfBuilder::new();
        let mut page_obj_ids: Vec<usize> = Vec::with_capacity(pages.len());

        for (page_idx, page) in pages.iter().enumerate() {
            let pixels = extract_strip(snapshot.image(), &page.strip)?;
            let image_id = self.write_image_xobject(&mut builder, &pixels)?;

            let content = build_content_stream(page, page_idx);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);
            let content_obj_id = builder.push_stream("/Filter /FlateDecode", &compressed);

            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /XObject << /Im{} {} 0 R >> >> >>",
                to_pt(page.width),
                to_pt(page.height),
                content_obj_id,
                page_idx,
                image_id
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = builder.push(build_info_dict(metadata).into_bytes());

        Ok(serialize(&builder, info_obj_id))
    }

    /// Write a strip as one or two XObject PDF objects.
    /// Returns the main XObject ID.
    fn write_image_xobject(&self, builder: &mut PdfBuilder, pixels: &StripPixels) -> Result<usize> {
        match self.encoding {
            ImageEncoding::Jpeg { quality } => {
                let flattened = match &pixels.alpha {
                    Some(alpha) => flatten_onto_white(&pixels.rgb, alpha),
                    None => pixels.rgb.clone(),
                };
                let mut jpeg = Vec::new();
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, quality)
                    .encode(&flattened, pixels.width, pixels.height, image::ColorType::Rgb8)
                    .map_err(|e| InvoiceError::Encoding(format!("JPEG encoding failed: {}", e)))?;
                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode",
                    pixels.width, pixels.height
                );
                Ok(builder.push_stream(&dict, &jpeg))
            }

            ImageEncoding::Flate => {
                // SMask first so the image can reference it
                let smask_ref = pixels.alpha.as_ref().map(|alpha| {
                    let compressed_alpha = compress_to_vec_zlib(alpha, 6);
                    let dict = format!(
                        "/Type /XObject /Subtype /Image /Width {} /Height {} \
                         /ColorSpace /DeviceGray /BitsPerComponent 8 /Filter /FlateDecode",
                        pixels.width, pixels.height
                    );
                    let id = builder.push_stream(&dict, &compressed_alpha);
                    format!(" /SMask {} 0 R", id)
                });

                let compressed_rgb = compress_to_vec_zlib(&pixels.rgb, 6);
                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode{}",
                    pixels.width,
                    pixels.height,
                    smask_ref.unwrap_or_default()
                );
                Ok(builder.push_stream(&dict, &compressed_rgb))
            }
        }
    }
}

/// Copy the strip's rows out of the snapshot as RGB plus optional alpha.
fn extract_strip(image: &RgbaImage, strip: &Strip) -> Result<StripPixels> {
    if strip.source_rows == 0 || strip.source_bottom() > image.height() {
        return Err(InvoiceError::Encoding(format!(
            "strip rows {}..{} are outside the {} px snapshot",
            strip.source_top,
            strip.source_bottom(),
            image.height()
        )));
    }

    let width = image.width();
    let row_bytes = width as usize * 4;
    let start = strip.source_top as usize * row_bytes;
    let end = strip.source_bottom() as usize * row_bytes;
    let rgba = &image.as_raw()[start..end];

    let pixel_count = width as usize * strip.source_rows as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut has_transparency = false;

    for pixel in rgba.chunks_exact(4) {
        rgb.extend_from_slice(&pixel[..3]);
        alpha.push(pixel[3]);
        if pixel[3] != 255 {
            has_transparency = true;
        }
    }

    Ok(StripPixels {
        width,
        height: strip.source_rows,
        rgb,
        alpha: if has_transparency { Some(alpha) } else { None },
    })
}

/// Composite RGB over a white page using the alpha channel.
fn flatten_onto_white(rgb: &[u8], alpha: &[u8]) -> Vec<u8> {
    rgb.chunks_exact(3)
        .zip(alpha)
        .flat_map(|(px, &a)| {
            let a = a as u32;
            px.iter()
                .map(move |&c| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8)
        })
        .collect()
}

/// Content stream drawing the page's single image.
fn build_content_stream(page: &LayoutPage, page_idx: usize) -> String {
    let strip = &page.strip;
    let x = to_pt(strip.x);
    let y = to_pt(page.height - strip.y - strip.height);
    let mut stream = String::new();
    let _ = write!(
        stream,
        "q\n{:.4} 0 0 {:.4} {:.4} {:.4} cm\n/Im{} Do\nQ\n",
        to_pt(strip.width),
        to_pt(strip.height),
        x,
        y,
        page_idx
    );
    stream
}

fn build_info_dict(metadata: &Metadata) -> String {
    let mut info = String::from("<< ");
    if let Some(ref title) = metadata.title {
        let _ = write!(info, "/Title {} ", pdf_text_string(title));
    }
    if let Some(ref author) = metadata.author {
        let _ = write!(info, "/Author {} ", pdf_text_string(author));
    }
    if let Some(ref subject) = metadata.subject {
        let _ = write!(info, "/Subject {} ", pdf_text_string(subject));
    }
    let _ = write!(
        info,
        "/Producer (invoicer {}) /Creator (invoicer) >>",
        env!("CARGO_PKG_VERSION")
    );
    info
}

/// Escape special characters in a literal PDF string.
fn escape_pdf_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)")
}

/// A PDF text string: a literal for printable ASCII, otherwise UTF-16BE
/// hex with a byte order mark.
fn pdf_text_string(s: &str) -> String {
    if s.chars().all(|c| (' '..='~').contains(&c)) {
        return format!("({})", escape_pdf_string(s));
    }
    let mut hex = String::from("<FEFF");
    for unit in s.encode_utf16() {
        let _ = write!(hex, "{:04X}", unit);
    }
    hex.push('>');
    hex
}

/// Serialize all objects into the final PDF byte stream.
fn serialize(builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
    let mut output: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

    output.extend_from_slice(b"%PDF-1.7\n");
    output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

    for (i, obj) in builder.objects.iter().enumerate().skip(1) {
        offsets[i] = output.len();
        let _ = write!(output, "{} 0 obj\n", i);
        output.extend_from_slice(&obj.data);
        output.extend_from_slice(b"\nendobj\n\n");
    }

    let xref_offset = output.len();
    let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
    let _ = write!(output, "0000000000 65535 f \n");
    for offset in offsets.iter().skip(1) {
        let _ = write!(output, "{:010} 00000 n \n", offset);
    }

    let _ = write!(
        output,
        "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
        builder.objects.len(),
        info_obj_id,
        xref_offset
    );

    output
}
