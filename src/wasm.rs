use wasm_bindgen::prelude::*;

use crate::{ExportOptions, ImageSource, InvoiceData};

fn parse_invoice(json: &str) -> Result<InvoiceData, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("JSON parse error: {}", e)))
}

/// Export with default options. `snapshot` is the PNG or JPEG bytes of the
/// rendered preview.
#[wasm_bindgen]
pub fn export_pdf(json: &str, snapshot: &[u8]) -> Result<Vec<u8>, JsValue> {
    let invoice = parse_invoice(json)?;
    crate::export(&invoice, &ImageSource::from_bytes(snapshot), &ExportOptions::default())
        .map(|doc| doc.bytes)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn compute_totals(json: &str) -> Result<JsValue, JsValue> {
    let totals = crate::totals_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_wasm_bindgen::to_value(&totals).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn export_filename(json: &str) -> Result<String, JsValue> {
    Ok(parse_invoice(json)?.export_filename())
}
