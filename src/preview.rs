//! # Preview Model
//!
//! Display values for the rendered document. The preview renderer (a browser
//! view, a template engine, anything that can produce the snapshot bitmap)
//! draws exactly these strings, so the numbers on the page and the numbers
//! in the ledger can't disagree.

use serde::Serialize;

use crate::ledger::{item_amount, InvoiceTotals};
use crate::model::{DocumentType, InvoiceData, Party};

const DATE_FORMAT: &str = "%B %d, %Y";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewDocument {
    /// `INVOICE` or `QUOTATION`.
    pub heading: String,
    /// `#INV-001`, absent when the number is blank.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    pub company: PartyBlock,
    pub client: PartyBlock,
    pub date: String,
    /// Only invoices carry a due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub rows: Vec<PreviewRow>,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    /// `label: value` lines for bank transfer details.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bank_lines: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub payment_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyBlock {
    pub name: String,
    /// Non-empty address lines in display order.
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRow {
    pub description: String,
    pub quantity: String,
    pub price: String,
    pub tax: String,
    pub amount: String,
}

impl PreviewDocument {
    pub fn build(data: &InvoiceData) -> Self {
        let totals = InvoiceTotals::compute(&data.items);
        let money = |amount: f64| format_money(amount, &data.currency);

        let number = data.invoice_number.trim();
        let rows: Vec<PreviewRow> = data
            .items
            .iter()
            .map(|item| PreviewRow {
                description: item.description.clone(),
                quantity: item.quantity.to_string(),
                price: money(item.price),
                tax: format!("{}%", format_percent(item.tax)),
                amount: money(item_amount(item.quantity, item.price)),
            })
            .collect();

        let bank_lines: Vec<String> = data
            .bank_details
            .as_ref()
            .map(|bank| {
                [
                    ("Bank", &bank.bank_name),
                    ("Account Name", &bank.account_name),
                    ("Account Number", &bank.account_number),
                    ("Routing Code", &bank.routing_code),
                ]
                .into_iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(label, value)| format!("{}: {}", label, value))
                .collect()
            })
            .unwrap_or_default();

        let mut payment_lines = Vec::new();
        if let Some(options) = &data.payment_options {
            if let Some(email) = options.paypal_email.as_deref().filter(|s| !s.is_empty()) {
                payment_lines.push(format!("PayPal: {}", email));
            }
            if let Some(upi) = options.upi_id.as_deref().filter(|s| !s.is_empty()) {
                payment_lines.push(format!("UPI: {}", upi));
            }
        }

        PreviewDocument {
            heading: data.document_type.heading().to_string(),
            number: (!number.is_empty()).then(|| format!("#{}", number)),
            company: PartyBlock::from_party(&data.company),
            client: PartyBlock::from_party(&data.client),
            date: data.date.format(DATE_FORMAT).to_string(),
            due_date: (data.document_type == DocumentType::Invoice)
                .then(|| data.due_date.format(DATE_FORMAT).to_string()),
            rows,
            subtotal: money(totals.subtotal),
            tax: money(totals.tax_total),
            total: money(totals.grand_total),
            notes: non_empty(&data.notes),
            terms: non_empty(&data.terms),
            bank_lines,
            payment_lines,
        }
    }
}

impl PartyBlock {
    fn from_party(party: &Party) -> Self {
        let locality = [party.city.as_str(), party.state.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        let locality = match (locality.is_empty(), party.zip.is_empty()) {
            (_, true) => locality,
            (true, false) => party.zip.clone(),
            (false, false) => format!("{} {}", locality, party.zip),
        };
        let lines: Vec<String> = [
            party.address.clone(),
            locality,
            party.phone.clone(),
            party.email.clone(),
        ]
        .into_iter()
        .filter(|line| !line.is_empty())
        .collect();
        PartyBlock {
            name: party.name.clone(),
            lines,
        }
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Symbol printed before an amount. Codes without a well-known symbol are
/// printed as the code followed by a space.
pub fn currency_symbol(code: &str) -> String {
    match code.trim().to_uppercase().as_str() {
        "USD" | "" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "INR" => "₹".to_string(),
        "JPY" => "¥".to_string(),
        other => format!("{} ", other),
    }
}

/// Two-decimal amount with the currency symbol, e.g. `$1234.50`.
pub fn format_money(amount: f64, currency: &str) -> String {
    // -0.00 would otherwise leak through for tiny negative rounding noise
    let amount = if amount.abs() < 0.005 { 0.0 } else { amount };
    format!("{}{:.2}", currency_symbol(currency), amount)
}

/// Tax rate without trailing zeros: 10 → "10", 7.5 → "7.5".
fn format_percent(rate: f64) -> String {
    let text = format!("{:.4}", rate);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BankDetails, LineItem, PaymentOptions};
    use chrono::NaiveDate;

    fn sample() -> InvoiceData {
        InvoiceData {
            invoice_number: "INV-9".into(),
            date: NaiveDate::from_ymd_opt(2026, 2, 4).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            company: Party {
                name: "Acme".into(),
                address: "1 Main St".into(),
                city: "Springfield".into(),
                state: "IL".into(),
                zip: "62701".into(),
                ..Party::default()
            },
            items: vec![
                LineItem {
                    description: "Design".into(),
                    quantity: 2,
                    price: 10.0,
                    tax: 10.0,
                    ..LineItem::new("a")
                },
                LineItem {
                    description: "Hosting".into(),
                    quantity: 1,
                    price: 5.0,
                    tax: 8.0,
                    ..LineItem::new("b")
                },
            ],
            ..InvoiceData::default()
        }
    }

    #[test]
    fn builds_display_values() {
        let preview = PreviewDocument::build(&sample());
        assert_eq!(preview.heading, "INVOICE");
        assert_eq!(preview.number.as_deref(), Some("#INV-9"));
        assert_eq!(preview.date, "February 04, 2026");
        assert_eq!(preview.due_date.as_deref(), Some("March 01, 2026"));
        assert_eq!(preview.company.lines, vec!["1 Main St", "Springfield, IL 62701"]);
        assert_eq!(preview.rows[0].amount, "$20.00");
        assert_eq!(preview.rows[0].tax, "10%");
        assert_eq!(preview.rows[1].tax, "8%");
        assert_eq!(preview.subtotal, "$25.00");
        assert_eq!(preview.tax, "$2.40");
        assert_eq!(preview.total, "$27.40");
    }

    #[test]
    fn quotation_has_no_due_date() {
        let mut data = sample();
        data.document_type = DocumentType::Quotation;
        let preview = PreviewDocument::build(&data);
        assert_eq!(preview.heading, "QUOTATION");
        assert!(preview.due_date.is_none());
    }

    #[test]
    fn payment_blocks() {
        let mut data = sample();
        data.bank_details = Some(BankDetails {
            bank_name: "First Bank".into(),
            account_number: "0012".into(),
            ..BankDetails::default()
        });
        data.payment_options = Some(PaymentOptions {
            paypal_email: None,
            upi_id: Some("acme@okbank".into()),
        });
        let preview = PreviewDocument::build(&data);
        assert_eq!(preview.bank_lines, vec!["Bank: First Bank", "Account Number: 0012"]);
        assert_eq!(preview.payment_lines, vec!["UPI: acme@okbank"]);
    }

    #[test]
    fn money_formatting() {
        assert_eq!(format_money(27.0, "USD"), "$27.00");
        assert_eq!(format_money(1234.5, "eur"), "€1234.50");
        assert_eq!(format_money(3.0, "CHF"), "CHF 3.00");
        assert_eq!(format_money(-0.001, "GBP"), "£0.00");
    }

    #[test]
    fn percent_trims_zeros() {
        assert_eq!(format_percent(10.0), "10");
        assert_eq!(format_percent(7.5), "7.5");
        assert_eq!(format_percent(0.0), "0");
    }
}
