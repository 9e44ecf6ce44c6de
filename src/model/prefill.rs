//! Company prefill from URL query parameters, e.g.
//! `?companyName=Acme&companyCity=Berlin`.

use super::{InvoiceData, PartyField};

fn company_field(key: &str) -> Option<PartyField> {
    match key {
        "companyName" => Some(PartyField::Name),
        "companyAddress" => Some(PartyField::Address),
        "companyCity" => Some(PartyField::City),
        "companyState" => Some(PartyField::State),
        "companyZip" => Some(PartyField::Zip),
        "companyPhone" => Some(PartyField::Phone),
        "companyEmail" => Some(PartyField::Email),
        _ => None,
    }
}

impl InvoiceData {
    /// Return a copy with company fields taken from a query string.
    /// A leading `?` is accepted; unknown keys are ignored.
    pub fn prefill_company(&self, query: &str) -> InvoiceData {
        let query = query.strip_prefix('?').unwrap_or(query);
        let commands = url::form_urlencoded::parse(query.as_bytes()).filter_map(|(key, value)| {
            company_field(&key)
                .map(|field| super::InvoiceCommand::UpdateCompany(field, value.into_owned()))
        });
        self.apply_all(commands)
    }
}
