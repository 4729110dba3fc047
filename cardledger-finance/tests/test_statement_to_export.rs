use chrono::NaiveDate;

use cardledger_core::{CardKind, ClassificationSource, ExtractionError};
use cardledger_finance::{
    AccountCatalog, DocumentResult, RuleSet, StatementPipeline, finalize, summarize,
};

/// Raw extracted text with the usual PDF damage: fused month/day, split
/// numerals, split currency name, page furniture between sections.
const MAY_STATEMENT: &str = "\
Statement of Account
Customer Number 0123456
BPI GOLD REWARDS CARD
Transaction Post Date Description Amount
May1 May 2 Payment -Thank You -13,544.89
May 3 May 4 Netflix.Com 549.00
September 15 September 18 Backblaze.Com SanMateo US
U . S . Dollar 40 . 42 2 , 337 . 48
Previous Balance 20,000.00
BPI E-CREDIT CARD
May 5 May 6 Metromart Makati 1 , 250 . 00
Ending Balance 8,000.00
";

fn pipeline() -> StatementPipeline {
    StatementPipeline::new(AccountCatalog::default(), &RuleSet::builtin()).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// End to end: damaged text through the pipeline into sorted export records.
#[test]
fn test_statement_text_to_export_records() {
    let parsed = pipeline().parse(MAY_STATEMENT, date(2024, 5, 12)).unwrap();
    assert_eq!(parsed.transactions.len(), 4);
    assert_eq!(parsed.unrecognized_lines, 0);

    let out = finalize(
        vec![DocumentResult {
            label: "Statement BPI Master 2024-05-12.txt".to_string(),
            statement_date: date(2024, 5, 12),
            outcome: Ok(parsed),
        }],
        None,
    );

    // Main records sort by transaction date, so the cross-year September
    // charge leads despite appearing mid-document.
    assert_eq!(out.main.len(), 4);
    assert_eq!(out.main[0].transaction_date, "2023-09-15");
    assert_eq!(out.main[0].currency, "USD");
    assert_eq!(out.main[0].foreign_amount, Some(40.42));
    assert_eq!(out.main[0].exchange_rate, Some(57.8298));

    assert_eq!(out.main[1].description, "Payment -Thank You");
    assert_eq!(out.main[1].amount, -13_544.89);
    assert_eq!(out.main[3].description, "Metromart Makati");
    assert_eq!(out.main[3].card, "BPI ECREDIT CARD");

    // Per-card split follows the section headers, combined rows carry the
    // card's liability account.
    assert_eq!(out.per_card[&CardKind::GoldRewards].len(), 3);
    assert_eq!(out.per_card[&CardKind::ECredit].len(), 1);
    let metromart = out
        .combined
        .iter()
        .find(|r| r.description == "Metromart Makati")
        .unwrap();
    assert_eq!(metromart.account, "Liabilities:Credit Card:BPI Mastercard:e-credit");
    assert_eq!(metromart.target_account, "Expenses:Food:Groceries");

    // Double entry: the payment lands in the Amount column, charges in the
    // negated column.
    let payment = out
        .double_entry
        .iter()
        .find(|r| r.description == "Payment -Thank You")
        .unwrap();
    assert_eq!(payment.amount_negated, 0.0);
    assert_eq!(payment.amount, 13_544.89);
}

/// A batch keeps going when one document fails and the cutoff drops whole
/// documents, not individual rows.
#[test]
fn test_batch_isolation_and_cutoff() {
    let p = pipeline();
    let old = p.parse(MAY_STATEMENT, date(2023, 11, 12)).unwrap();
    let new = p.parse(MAY_STATEMENT, date(2024, 5, 12)).unwrap();

    let out = finalize(
        vec![
            DocumentResult {
                label: "Statement BPI Master 2023-11-12.txt".to_string(),
                statement_date: date(2023, 11, 12),
                outcome: Ok(old),
            },
            DocumentResult {
                label: "Statement BPI Master 2024-04-12.txt".to_string(),
                statement_date: date(2024, 4, 12),
                outcome: Err(ExtractionError::EmptyDocument),
            },
            DocumentResult {
                label: "Statement BPI Master 2024-05-12.txt".to_string(),
                statement_date: date(2024, 5, 12),
                outcome: Ok(new),
            },
        ],
        Some(date(2024, 1, 1)),
    );

    assert_eq!(out.skipped, vec!["Statement BPI Master 2023-11-12.txt".to_string()]);
    assert_eq!(out.reports.len(), 2);
    assert!(out.reports[0].error.as_deref().unwrap().contains("empty document"));
    assert!(out.reports[1].error.is_none());
    assert_eq!(out.reports[1].transactions, 4);
    assert_eq!(out.main.len(), 4);
}

/// Summary numbers a reviewer sees before opening the CSVs.
#[test]
fn test_batch_summary_from_parsed_statement() {
    let parsed = pipeline().parse(MAY_STATEMENT, date(2024, 5, 12)).unwrap();
    let summary = summarize(&parsed.transactions);

    assert_eq!(summary.transactions, 4);
    assert_eq!(summary.by_card[&CardKind::GoldRewards].count, 3);
    assert_eq!(summary.by_card[&CardKind::ECredit].count, 1);
    assert_eq!(summary.by_currency["USD"].foreign_total, 40.42);
    assert_eq!(summary.by_currency["PHP"].count, 3);

    // Every line in this statement hits the curated tables.
    assert_eq!(summary.manual_review, 0);
    assert_eq!(summary.auto_mapped, 4);
    assert!((summary.auto_mapped_pct - 100.0).abs() < f64::EPSILON);
    assert!(
        parsed
            .transactions
            .iter()
            .all(|t| t.source != ClassificationSource::Default)
    );
}
