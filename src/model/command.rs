//! # Update Commands
//!
//! Every form edit is an explicit command. Applying a command never touches
//! the receiver: it returns a new `InvoiceData` snapshot, so a value handed
//! to the exporter can't change underneath it.

use chrono::NaiveDate;

use super::input::{coerce_price, coerce_tax};
use super::{BankDetails, DocumentType, InvoiceData, LineItem, Party, PaymentOptions};

/// Which field of a company/client block to set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyField {
    Name,
    Address,
    City,
    State,
    Zip,
    Phone,
    Email,
}

impl PartyField {
    fn slot<'a>(&self, party: &'a mut Party) -> &'a mut String {
        match self {
            PartyField::Name => &mut party.name,
            PartyField::Address => &mut party.address,
            PartyField::City => &mut party.city,
            PartyField::State => &mut party.state,
            PartyField::Zip => &mut party.zip,
            PartyField::Phone => &mut party.phone,
            PartyField::Email => &mut party.email,
        }
    }
}

/// A new value for one field of a line item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemField {
    Description(String),
    Quantity(u32),
    Price(f64),
    Tax(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum InvoiceCommand {
    SetDocumentType(DocumentType),
    SetInvoiceNumber(String),
    SetDate(NaiveDate),
    SetDueDate(NaiveDate),
    SetCurrency(String),
    UpdateCompany(PartyField, String),
    UpdateClient(PartyField, String),
    /// Append a blank item. Its tax starts at the document default rate.
    AddItem,
    UpdateItem { id: String, field: ItemField },
    RemoveItem(String),
    SetNotes(String),
    SetTerms(String),
    /// Change the default rate for items added from now on.
    SetDefaultTaxRate(f64),
    SetBankDetails(Option<BankDetails>),
    SetPaymentOptions(Option<PaymentOptions>),
}

impl InvoiceData {
    /// Apply one command and return the resulting snapshot.
    ///
    /// Commands that target an unknown item id return an unchanged copy.
    pub fn apply(&self, command: InvoiceCommand) -> InvoiceData {
        let mut next = self.clone();
        match command {
            InvoiceCommand::SetDocumentType(document_type) => next.document_type = document_type,
            InvoiceCommand::SetInvoiceNumber(number) => next.invoice_number = number,
            InvoiceCommand::SetDate(date) => next.date = date,
            InvoiceCommand::SetDueDate(date) => next.due_date = date,
            InvoiceCommand::SetCurrency(code) => next.currency = code.trim().to_uppercase(),
            InvoiceCommand::UpdateCompany(field, value) => *field.slot(&mut next.company) = value,
            InvoiceCommand::UpdateClient(field, value) => *field.slot(&mut next.client) = value,
            InvoiceCommand::AddItem => {
                let mut item = LineItem::new(next.next_item_id());
                item.tax = next.tax_rate;
                next.items.push(item);
            }
            InvoiceCommand::UpdateItem { id, field } => {
                match next.items.iter_mut().find(|item| item.id == id) {
                    Some(item) => match field {
                        ItemField::Description(text) => item.description = text,
                        ItemField::Quantity(quantity) => item.quantity = quantity.max(1),
                        ItemField::Price(price) => item.price = coerce_price(price),
                        ItemField::Tax(tax) => item.tax = coerce_tax(tax),
                    },
                    None => log::debug!("update ignored: no line item with id {:?}", id),
                }
            }
            InvoiceCommand::RemoveItem(id) => next.items.retain(|item| item.id != id),
            InvoiceCommand::SetNotes(notes) => next.notes = notes,
            InvoiceCommand::SetTerms(terms) => next.terms = terms,
            InvoiceCommand::SetDefaultTaxRate(rate) => next.tax_rate = coerce_tax(rate),
            InvoiceCommand::SetBankDetails(details) => {
                next.bank_details = details.filter(|d| !d.is_empty())
            }
            InvoiceCommand::SetPaymentOptions(options) => {
                next.payment_options = options.filter(|o| !o.is_empty())
            }
        }
        next
    }

    /// Apply a sequence of commands in order.
    pub fn apply_all<I>(&self, commands: I) -> InvoiceData
    where
        I: IntoIterator<Item = InvoiceCommand>,
    {
        commands
            .into_iter()
            .fold(self.clone(), |data, command| data.apply(command))
    }

    /// First `item-N` id not already taken.
    fn next_item_id(&self) -> String {
        let mut n = self.items.len() + 1;
        loop {
            let candidate = format!("item-{}", n);
            if self.item(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }
}
