//! cardledger-core: transaction data model, date resolution and currency
//! handling for BPI credit-card statements.

pub mod currency;
pub mod dates;
pub mod error;
pub mod types;

pub use currency::{HOME_CURRENCY, ResolvedCurrency, currency_symbol, exchange_rate};
pub use dates::{StatementAnchor, month_from_name, resolve_year};
pub use error::{ExtractionError, Warning};
pub use types::{
    Alternative, CardKind, ClassificationSource, ForeignLeg, PartialDate, RawTransaction,
    Transaction,
};
