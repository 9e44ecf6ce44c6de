//! # Ledger
//!
//! Totals derived from line items. Everything here is a pure function over
//! a borrowed slice; totals are recomputed on every read and never stored.
//!
//! The per-item tax rate is authoritative: a rate of 0 means no tax, it
//! never falls back to the document's default rate.

use serde::Serialize;

use crate::model::LineItem;

/// `quantity * price` for one row.
pub fn item_amount(quantity: u32, price: f64) -> f64 {
    quantity as f64 * price
}

/// Tax contributed by one item. A NaN rate counts as 0.
pub fn item_tax(item: &LineItem) -> f64 {
    let rate = if item.tax.is_nan() { 0.0 } else { item.tax };
    item_amount(item.quantity, item.price) * (rate / 100.0)
}

pub fn subtotal(items: &[LineItem]) -> f64 {
    items
        .iter()
        .map(|item| item_amount(item.quantity, item.price))
        .sum()
}

pub fn tax_total(items: &[LineItem]) -> f64 {
    items.iter().map(item_tax).sum()
}

pub fn total(items: &[LineItem]) -> f64 {
    subtotal(items) + tax_total(items)
}

/// All three aggregates of an item list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub subtotal: f64,
    pub tax_total: f64,
    pub grand_total: f64,
}

impl InvoiceTotals {
    pub fn compute(items: &[LineItem]) -> Self {
        let subtotal = subtotal(items);
        let tax_total = tax_total(items);
        Self {
            subtotal,
            tax_total,
            grand_total: subtotal + tax_total,
        }
    }
}
