//! Per-document pipeline: raw extracted text in, enriched transactions out.
//!
//! The pipeline owns the compiled parser and the classifier so a batch run
//! pays the construction cost once. Each call to [`StatementPipeline::parse`]
//! is independent; the same text and statement date always produce the same
//! transactions in the same order.

use anyhow::Result;
use chrono::NaiveDate;

use cardledger_core::{
    ClassificationSource, ExtractionError, StatementAnchor, Transaction, Warning, currency,
};
use cardledger_ingest::LineParser;

use crate::catalog::{AccountCatalog, RuleSet};
use crate::classifier::AccountClassifier;

/// One fully processed document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStatement {
    pub transactions: Vec<Transaction>,
    pub warnings: Vec<Warning>,
    pub unrecognized_lines: usize,
    pub statement_date: NaiveDate,
}

pub struct StatementPipeline {
    parser: LineParser,
    classifier: AccountClassifier,
}

impl StatementPipeline {
    pub fn new(catalog: AccountCatalog, rules: &RuleSet) -> Result<Self> {
        Ok(Self {
            parser: LineParser::new()?,
            classifier: AccountClassifier::new(catalog, rules),
        })
    }

    pub fn with_fuzzy_threshold(
        catalog: AccountCatalog,
        rules: &RuleSet,
        threshold: u8,
    ) -> Result<Self> {
        Ok(Self {
            parser: LineParser::new()?,
            classifier: AccountClassifier::with_fuzzy_threshold(catalog, rules, threshold),
        })
    }

    /// Process one document's extracted text against its statement date.
    ///
    /// Fails only when the document itself is unusable; every per-line
    /// problem is carried as a warning instead. Transactions whose
    /// month/day cannot form a real calendar date are dropped with a
    /// warning rather than guessed at.
    pub fn parse(
        &self,
        text: &str,
        statement_date: NaiveDate,
    ) -> std::result::Result<ParsedStatement, ExtractionError> {
        let outcome = self.parser.parse(text)?;
        let anchor = StatementAnchor::from_date(statement_date);

        let mut transactions = Vec::with_capacity(outcome.transactions.len());
        let mut warnings = outcome.warnings;

        for raw in outcome.transactions {
            let (Some(trans_date), Some(post_date)) =
                (raw.trans_date.resolve(anchor), raw.post_date.resolve(anchor))
            else {
                warnings.push(Warning::Parse(format!(
                    "invalid calendar date on '{}', transaction dropped",
                    raw.description
                )));
                continue;
            };

            let resolved = currency::resolve(raw.foreign.as_ref());
            if let Some(w) = resolved.warning {
                warnings.push(w);
            }
            let foreign_amount = raw.foreign.as_ref().map(|leg| leg.amount);
            let exchange_rate = raw
                .foreign
                .as_ref()
                .and_then(|leg| currency::exchange_rate(raw.amount, leg.amount));

            let matched = self.classifier.classify(&raw.description);

            transactions.push(Transaction {
                card: raw.card,
                trans_date,
                post_date,
                description: raw.description,
                amount: raw.amount,
                currency: resolved.code,
                foreign_amount,
                exchange_rate,
                target_account: matched.account,
                confidence: matched.confidence,
                source: matched.source,
                alternatives: matched.alternatives,
                statement_date,
            });
        }

        Ok(ParsedStatement {
            transactions,
            warnings,
            unrecognized_lines: outcome.unrecognized_lines,
            statement_date,
        })
    }

    pub fn classifier(&self) -> &AccountClassifier {
        &self.classifier
    }
}

/// Apply reviewer corrections by transaction index. Only the target account
/// and the source marker change; amounts, dates, currency, confidence and
/// alternatives stay exactly as parsed.
pub fn apply_overrides(transactions: &mut [Transaction], overrides: &[(usize, String)]) {
    for (index, account) in overrides {
        if let Some(txn) = transactions.get_mut(*index) {
            txn.target_account = account.clone();
            txn.source = ClassificationSource::Manual;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATEMENT: &str = "\
BPI GOLD REWARDS CARD
May 1 May 2 Payment -Thank You -13,544.89
May 3 May 4 Netflix.Com 549.00
September 15 September 18 Backblaze.Com SanMateo US
U.S.Dollar 40.42 2,337.48
BPI ECREDIT CARD
May 5 May 6 Lazada Makati 1,250.00
";

    fn pipeline() -> StatementPipeline {
        StatementPipeline::new(AccountCatalog::default(), &RuleSet::builtin()).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_full_document_pipeline() {
        let parsed = pipeline().parse(STATEMENT, date(2024, 5, 12)).unwrap();
        assert_eq!(parsed.transactions.len(), 4);

        let payment = &parsed.transactions[0];
        assert_eq!(payment.trans_date, date(2024, 5, 1));
        assert_eq!(payment.currency, "PHP");
        assert_eq!(payment.target_account, "Liabilities:Credit Card:BPI Mastercard");
        assert_eq!(payment.confidence, 95);
        assert!(!payment.is_charge());

        let foreign = &parsed.transactions[2];
        assert_eq!(foreign.currency, "USD");
        assert_eq!(foreign.foreign_amount, Some(40.42));
        assert_eq!(foreign.exchange_rate, Some(57.8298));
        // September on a May statement belongs to the previous year.
        assert_eq!(foreign.trans_date, date(2023, 9, 15));

        let ecredit = &parsed.transactions[3];
        assert_eq!(ecredit.card, cardledger_core::CardKind::ECredit);
        assert_eq!(ecredit.statement_date, date(2024, 5, 12));
    }

    #[test]
    fn test_invalid_calendar_date_dropped_with_warning() {
        let text = "\
BPI GOLD REWARDS CARD
February 30 February 30 Ghost Merchant 100.00
May 3 May 4 Netflix.Com 549.00
";
        let parsed = pipeline().parse(text, date(2024, 5, 12)).unwrap();
        assert_eq!(parsed.transactions.len(), 1);
        assert!(parsed.warnings.iter().any(|w| match w {
            Warning::Parse(msg) => msg.contains("Ghost Merchant"),
            _ => false,
        }));
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let p = pipeline();
        let a = p.parse(STATEMENT, date(2024, 5, 12)).unwrap();
        let b = p.parse(STATEMENT, date(2024, 5, 12)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_document_is_an_error() {
        let err = pipeline().parse("\n  \n", date(2024, 5, 12)).unwrap_err();
        assert!(matches!(err, ExtractionError::EmptyDocument));
    }

    #[test]
    fn test_apply_overrides_marks_manual() {
        let mut parsed = pipeline().parse(STATEMENT, date(2024, 5, 12)).unwrap();
        let before = parsed.transactions[1].clone();

        apply_overrides(
            &mut parsed.transactions,
            &[(1, "Expenses:Entertainment:Music/Movies".to_string()), (99, "Ignored".to_string())],
        );

        let txn = &parsed.transactions[1];
        assert_eq!(txn.target_account, "Expenses:Entertainment:Music/Movies");
        assert_eq!(txn.source, ClassificationSource::Manual);
        assert_eq!(txn.confidence, before.confidence);
        assert_eq!(txn.amount, before.amount);
        assert_eq!(txn.alternatives, before.alternatives);
        // Out-of-range index is ignored.
        assert_eq!(parsed.transactions.len(), 4);
    }
}
