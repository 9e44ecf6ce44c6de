//! # Invoice Model
//!
//! The data an invoice or quotation is built from. An `InvoiceData` value is
//! an immutable snapshot: the form layer never mutates it in place, it
//! applies an [`InvoiceCommand`] and receives a new value (see `command`).
//!
//! Field names serialize in camelCase so the same JSON the browser form
//! produces can be fed straight into the exporter.

pub mod command;
pub mod input;
pub mod prefill;

pub use command::{InvoiceCommand, ItemField, PartyField};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Invoices show a due date; quotations don't.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    #[default]
    Invoice,
    Quotation,
}

impl DocumentType {
    /// Lowercase name used in file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "invoice",
            DocumentType::Quotation => "quotation",
        }
    }

    /// Uppercase heading shown at the top of the document.
    pub fn heading(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "INVOICE",
            DocumentType::Quotation => "QUOTATION",
        }
    }

    /// Title-case label, e.g. for "Invoice Number".
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "Invoice",
            DocumentType::Quotation => "Quotation",
        }
    }
}

/// One address block: the issuing company or the billed client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Party {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
    pub email: String,
}

/// One billable row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(
        default = "input::default_quantity",
        deserialize_with = "input::lenient_quantity"
    )]
    pub quantity: u32,
    /// Unit price.
    #[serde(default, deserialize_with = "input::lenient_price")]
    pub price: f64,
    /// Tax rate in percent, within `[0, 100]`.
    #[serde(default, alias = "taxPercent", deserialize_with = "input::lenient_tax")]
    pub tax: f64,
}

impl LineItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            quantity: 1,
            price: 0.0,
            tax: 0.0,
        }
    }
}

/// Bank transfer details printed below the totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BankDetails {
    pub bank_name: String,
    pub account_name: String,
    pub account_number: String,
    /// Routing / sort / IFSC / SWIFT code, whichever the bank uses.
    pub routing_code: String,
}

impl BankDetails {
    pub fn is_empty(&self) -> bool {
        self.bank_name.is_empty()
            && self.account_name.is_empty()
            && self.account_number.is_empty()
            && self.routing_code.is_empty()
    }
}

/// Alternative ways to pay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaymentOptions {
    /// Payment-service account email (PayPal).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paypal_email: Option<String>,
    /// Region-specific payment identifier (UPI ID).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,
}

impl PaymentOptions {
    pub fn is_empty(&self) -> bool {
        self.paypal_email.as_deref().map_or(true, str::is_empty)
            && self.upi_id.as_deref().map_or(true, str::is_empty)
    }
}

/// A complete invoice or quotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceData {
    #[serde(default)]
    pub document_type: DocumentType,

    #[serde(default)]
    pub invoice_number: String,

    /// Issue date.
    #[serde(default = "today")]
    pub date: NaiveDate,

    #[serde(default = "today")]
    pub due_date: NaiveDate,

    /// ISO 4217 code. Display label only; amounts are never converted.
    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default)]
    pub company: Party,

    #[serde(default)]
    pub client: Party,

    #[serde(default)]
    pub items: Vec<LineItem>,

    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub terms: String,

    /// Default tax rate (percent) given to newly added line items.
    #[serde(default, deserialize_with = "input::lenient_tax")]
    pub tax_rate: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<BankDetails>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_options: Option<PaymentOptions>,
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for InvoiceData {
    /// A blank invoice dated today with a single empty line item, the
    /// state a fresh form starts in.
    fn default() -> Self {
        let date = today();
        Self {
            document_type: DocumentType::Invoice,
            invoice_number: String::new(),
            date,
            due_date: date,
            currency: default_currency(),
            company: Party::default(),
            client: Party::default(),
            items: vec![LineItem::new("1")],
            notes: String::new(),
            terms: String::new(),
            tax_rate: 0.0,
            bank_details: None,
            payment_options: None,
        }
    }
}

impl InvoiceData {
    /// File name of the exported document:
    /// `<documentType>-<invoiceNumber or "draft">.pdf`.
    pub fn export_filename(&self) -> String {
        let number = self.invoice_number.trim();
        let number = if number.is_empty() { "draft" } else { number };
        format!("{}-{}.pdf", self.document_type.as_str(), number)
    }

    /// Document title used in the PDF metadata, e.g. `Invoice #INV-001`.
    pub fn title(&self) -> String {
        let number = self.invoice_number.trim();
        if number.is_empty() {
            self.document_type.label().to_string()
        } else {
            format!("{} #{}", self.document_type.label(), number)
        }
    }

    pub fn item(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_uses_number() {
        let mut data = InvoiceData::default();
        data.invoice_number = "INV-042".to_string();
        assert_eq!(data.export_filename(), "invoice-INV-042.pdf");
    }

    #[test]
    fn filename_falls_back_to_draft() {
        let mut data = InvoiceData::default();
        data.document_type = DocumentType::Quotation;
        data.invoice_number = "   ".to_string();
        assert_eq!(data.export_filename(), "quotation-draft.pdf");
    }

    #[test]
    fn default_has_one_blank_item() {
        let data = InvoiceData::default();
        assert_eq!(data.items.len(), 1);
        assert_eq!(data.items[0].quantity, 1);
        assert_eq!(data.items[0].price, 0.0);
        assert_eq!(data.date, data.due_date);
    }

    #[test]
    fn deserializes_form_json() {
        let json = r#"{
            "documentType": "quotation",
            "invoiceNumber": "Q-7",
            "date": "2026-02-14",
            "dueDate": "2026-03-01",
            "currency": "EUR",
            "company": { "name": "Acme" },
            "items": [
                { "id": "a", "description": "Design", "quantity": 2, "price": 10.5, "tax": 10 },
                { "id": "b", "quantity": "abc", "price": null, "taxPercent": "7.5" }
            ],
            "taxRate": 5
        }"#;
        let data: InvoiceData = serde_json::from_str(json).unwrap();
        assert_eq!(data.document_type, DocumentType::Quotation);
        assert_eq!(data.date, NaiveDate::from_ymd_opt(2026, 2, 14).unwrap());
        assert_eq!(data.company.name, "Acme");
        assert_eq!(data.client, Party::default());
        assert_eq!(data.items[0].quantity, 2);
        assert_eq!(data.items[1].quantity, 1);
        assert_eq!(data.items[1].price, 0.0);
        assert_eq!(data.items[1].tax, 7.5);
        assert_eq!(data.tax_rate, 5.0);
        assert!(data.bank_details.is_none());
    }

    #[test]
    fn payment_options_emptiness() {
        assert!(PaymentOptions::default().is_empty());
        let opts = PaymentOptions {
            paypal_email: Some(String::new()),
            upi_id: Some("acme@upi".to_string()),
        };
        assert!(!opts.is_empty());
    }

    #[test]
    fn title_includes_number() {
        let mut data = InvoiceData::default();
        assert_eq!(data.title(), "Invoice");
        data.invoice_number = "7".to_string();
        assert_eq!(data.title(), "Invoice #7");
    }
}
