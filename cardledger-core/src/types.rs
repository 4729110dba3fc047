//! Transaction data model shared across the parsing and export crates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Physical card a statement section belongs to.
///
/// BPI statements interleave sections for each card behind the account; a
/// parser is always inside exactly one section (or `Unknown` before the
/// first header line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CardKind {
    #[serde(rename = "gold-rewards")]
    GoldRewards,
    #[serde(rename = "ecredit")]
    ECredit,
    #[serde(rename = "unknown")]
    Unknown,
}

impl CardKind {
    /// Card name as printed in export files.
    pub fn display_name(&self) -> &'static str {
        match self {
            CardKind::GoldRewards => "BPI GOLD REWARDS CARD",
            CardKind::ECredit => "BPI ECREDIT CARD",
            CardKind::Unknown => "UNKNOWN CARD",
        }
    }

    /// Liability account bound to this card in the combined export.
    pub fn liability_account(&self) -> &'static str {
        match self {
            CardKind::GoldRewards => "Liabilities:Credit Card:BPI Mastercard:Gold",
            CardKind::ECredit => "Liabilities:Credit Card:BPI Mastercard:e-credit",
            CardKind::Unknown => "Liabilities:Credit Card:BPI Mastercard",
        }
    }
}

/// A statement date with the year still unknown.
///
/// Statement rows print only "Month Day"; the year comes later from the
/// statement anchor (see [`crate::dates`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialDate {
    pub month: u32,
    pub day: u32,
}

impl PartialDate {
    pub fn new(month: u32, day: u32) -> Self {
        Self { month, day }
    }
}

/// Foreign-currency leg of a two-line transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignLeg {
    /// Trailing country/currency hint from the first line, e.g. "US".
    pub country_hint: String,
    /// Currency name from the second line, e.g. "U.S.Dollar".
    pub currency_name: String,
    /// Amount in the foreign currency.
    pub amount: f64,
}

/// Transaction as emitted by the line parser: dates unresolved, currency
/// undetermined, unclassified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub card: CardKind,
    pub trans_date: PartialDate,
    pub post_date: PartialDate,
    pub description: String,
    /// Signed amount in the statement's home currency.
    pub amount: f64,
    pub foreign: Option<ForeignLeg>,
}

/// Which classification tier produced a target account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassificationSource {
    #[serde(rename = "exact")]
    Exact,
    #[serde(rename = "fuzzy")]
    Fuzzy,
    #[serde(rename = "keyword")]
    Keyword,
    #[serde(rename = "default")]
    Default,
    /// A reviewer override replaced the classifier's pick.
    #[serde(rename = "manual")]
    Manual,
}

/// Runner-up candidate surfaced to the reviewer on fuzzy matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    pub account: String,
    /// Similarity score 0-100.
    pub score: u8,
}

/// Fully enriched transaction: the unit exported to every output file and
/// the unit a reviewer corrects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub card: CardKind,
    pub trans_date: NaiveDate,
    pub post_date: NaiveDate,
    pub description: String,
    /// Signed amount in the home currency.
    pub amount: f64,
    /// ISO-style code, or a literal passthrough for unrecognized names.
    pub currency: String,
    pub foreign_amount: Option<f64>,
    /// Home amount / foreign amount, 4 decimal places. None when there is
    /// no foreign leg or the foreign amount is zero.
    pub exchange_rate: Option<f64>,
    pub target_account: String,
    /// Classifier certainty, 0-100.
    pub confidence: u8,
    pub source: ClassificationSource,
    pub alternatives: Vec<Alternative>,
    pub statement_date: NaiveDate,
}

impl Transaction {
    /// Returns true if this is a charge (negative amounts are credits or
    /// payments on BPI statements).
    pub fn is_charge(&self) -> bool {
        self.amount > 0.0
    }

    pub fn is_foreign(&self) -> bool {
        self.foreign_amount.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liability_accounts_per_card() {
        assert_eq!(
            CardKind::GoldRewards.liability_account(),
            "Liabilities:Credit Card:BPI Mastercard:Gold"
        );
        assert_eq!(
            CardKind::ECredit.liability_account(),
            "Liabilities:Credit Card:BPI Mastercard:e-credit"
        );
        assert_eq!(
            CardKind::Unknown.liability_account(),
            "Liabilities:Credit Card:BPI Mastercard"
        );
    }

    #[test]
    fn test_classification_source_serde_names() {
        let json = serde_json::to_string(&ClassificationSource::Fuzzy).unwrap();
        assert_eq!(json, "\"fuzzy\"");
        let back: ClassificationSource = serde_json::from_str("\"manual\"").unwrap();
        assert_eq!(back, ClassificationSource::Manual);
    }
}
