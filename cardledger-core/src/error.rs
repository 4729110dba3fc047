//! Error and warning taxonomy.
//!
//! Only a document-level failure to produce any structured line is an error.
//! Everything below that (odd lines, unknown currencies) is recovered locally
//! and surfaced as a `Warning` on the document's result.

use std::fmt;

use thiserror::Error;

/// Fatal, per-document: no transactions could be derived at all.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("empty document: no text lines to parse")]
    EmptyDocument,

    #[error("could not read document: {0}")]
    Unreadable(String),
}

/// Non-fatal, per-line or per-transaction quality signal.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Warning {
    /// Unrecognized or malformed line; processing continued.
    Parse(String),
    /// Unrecognized currency name; the literal was passed through.
    Currency(String),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Parse(msg) => write!(f, "parse: {msg}"),
            Warning::Currency(msg) => write!(f, "currency: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display_carries_kind() {
        let w = Warning::Parse("line 12 unrecognized".to_string());
        assert_eq!(w.to_string(), "parse: line 12 unrecognized");

        let w = Warning::Currency("'Fantasy Dollar' not in catalog".to_string());
        assert!(w.to_string().starts_with("currency: "));
    }

    #[test]
    fn test_extraction_error_messages() {
        assert_eq!(
            ExtractionError::EmptyDocument.to_string(),
            "empty document: no text lines to parse"
        );
        assert!(
            ExtractionError::Unreadable("io error".to_string())
                .to_string()
                .contains("io error")
        );
    }
}
