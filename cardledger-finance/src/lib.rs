//! cardledger-finance: account classification, the per-document parsing
//! pipeline, and batch finalization into accounting-ready record sets.

pub mod catalog;
pub mod classifier;
pub mod finalizer;
pub mod pipeline;
pub mod summary;

pub use catalog::{AccountCatalog, ClassificationRule, RuleSet, RuleTier};
pub use classifier::{AccountClassifier, ClassifierMatch};
pub use finalizer::{
    BatchOutput, CardRecord, CombinedRecord, DocumentReport, DocumentResult, DoubleEntryRecord,
    MainRecord, card_filename, combined_filename, finalize, main_filename,
};
pub use pipeline::{ParsedStatement, StatementPipeline, apply_overrides};
pub use summary::{BatchSummary, CardSummary, CurrencySummary, summarize};
