//! Structured error types for invoice export.
//!
//! Capture and encoding failures are the two ways an export can fail once
//! it has started. Parsing and geometry errors are raised before any work
//! is done.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, InvoiceError>;

/// The unified error type returned by all public functions.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// JSON input failed to parse as invoice data or export options.
    #[error("Failed to parse invoice: {source}{}", format_hint(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// The snapshot bitmap could not be obtained or decoded.
    #[error("Capture error: {0}")]
    Capture(String),

    /// A strip could not be encoded into the output document.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Page geometry or export options are unusable.
    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for InvoiceError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the invoice schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        InvoiceError::Parse { source: e, hint }
    }
}

impl InvoiceError {
    /// Whether this error happened after the export started (capture or
    /// encoding), as opposed to bad input.
    pub fn is_export_failure(&self) -> bool {
        matches!(self, InvoiceError::Capture(_) | InvoiceError::Encoding(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_carries_hint() {
        let err: InvoiceError = serde_json::from_str::<serde_json::Value>("{ \"a\": 1, }")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse invoice"));
        assert!(msg.contains("trailing commas"));
    }

    #[test]
    fn eof_error_hint() {
        let err: InvoiceError = serde_json::from_str::<serde_json::Value>("{ \"a\": ")
            .unwrap_err()
            .into();
        assert!(err.to_string().contains("truncated"));
    }

    #[test]
    fn export_failure_classification() {
        assert!(InvoiceError::Capture("missing".into()).is_export_failure());
        assert!(InvoiceError::Encoding("bad".into()).is_export_failure());
        assert!(!InvoiceError::Geometry("zoom".into()).is_export_failure());
    }
}
