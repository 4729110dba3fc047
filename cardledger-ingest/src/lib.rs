//! cardledger-ingest: text normalization and line parsing for extracted
//! BPI statement text.

pub mod normalizer;
pub mod parser;

pub use normalizer::Normalizer;
pub use parser::{LineParser, ParseOutcome};
