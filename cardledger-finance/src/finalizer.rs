//! Batch finalization: turn per-document parse results into the CSV-ready
//! record sets the accounting import expects.
//!
//! Column names and order are part of the import contract; the serde renames
//! on each record struct are load-bearing.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use cardledger_core::{CardKind, ExtractionError, Transaction, Warning};

use crate::pipeline::ParsedStatement;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Full-detail review record, one per transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MainRecord {
    #[serde(rename = "Card")]
    pub card: String,
    #[serde(rename = "Transaction Date")]
    pub transaction_date: String,
    #[serde(rename = "Post Date")]
    pub post_date: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Amount")]
    pub amount: f64,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Foreign Amount")]
    pub foreign_amount: Option<f64>,
    #[serde(rename = "Exchange Rate")]
    pub exchange_rate: Option<f64>,
    #[serde(rename = "Target Account")]
    pub target_account: String,
    #[serde(rename = "Statement Date")]
    pub statement_date: String,
}

/// Import record for one card's file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardRecord {
    #[serde(rename = "Post Date")]
    pub post_date: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Amount")]
    pub amount: f64,
    #[serde(rename = "Target Account")]
    pub target_account: String,
}

/// Import record for the combined file; the source account is the card's
/// liability account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Amount")]
    pub amount: f64,
    #[serde(rename = "Account")]
    pub account: String,
    #[serde(rename = "Target Account")]
    pub target_account: String,
}

/// Double-entry shape: charges in the negated column, credits in the amount
/// column, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoubleEntryRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Amount (Negated)")]
    pub amount_negated: f64,
    #[serde(rename = "Amount")]
    pub amount: f64,
    #[serde(rename = "Account")]
    pub account: String,
    #[serde(rename = "Target Account")]
    pub target_account: String,
}

/// One document going into a batch: a label for reporting plus the pipeline
/// result, successful or not.
#[derive(Debug)]
pub struct DocumentResult {
    pub label: String,
    pub statement_date: NaiveDate,
    pub outcome: Result<ParsedStatement, ExtractionError>,
}

/// Per-document line of the batch report.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentReport {
    pub label: String,
    pub statement_date: NaiveDate,
    pub transactions: usize,
    pub warnings: Vec<Warning>,
    pub error: Option<String>,
}

/// Every record set derived from one batch, plus the per-document report.
#[derive(Debug, Default)]
pub struct BatchOutput {
    pub main: Vec<MainRecord>,
    pub per_card: BTreeMap<CardKind, Vec<CardRecord>>,
    pub combined: Vec<CombinedRecord>,
    pub double_entry: Vec<DoubleEntryRecord>,
    pub reports: Vec<DocumentReport>,
    /// Labels of documents excluded by the cutoff.
    pub skipped: Vec<String>,
}

fn fmt(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn main_record(txn: &Transaction) -> MainRecord {
    MainRecord {
        card: txn.card.display_name().to_string(),
        transaction_date: fmt(txn.trans_date),
        post_date: fmt(txn.post_date),
        description: txn.description.clone(),
        amount: txn.amount,
        currency: txn.currency.clone(),
        foreign_amount: txn.foreign_amount,
        exchange_rate: txn.exchange_rate,
        target_account: txn.target_account.clone(),
        statement_date: fmt(txn.statement_date),
    }
}

fn card_record(txn: &Transaction) -> CardRecord {
    CardRecord {
        post_date: fmt(txn.post_date),
        description: txn.description.clone(),
        amount: txn.amount,
        target_account: txn.target_account.clone(),
    }
}

fn combined_record(txn: &Transaction) -> CombinedRecord {
    CombinedRecord {
        date: fmt(txn.post_date),
        description: txn.description.clone(),
        amount: txn.amount,
        account: txn.card.liability_account().to_string(),
        target_account: txn.target_account.clone(),
    }
}

fn double_entry_record(txn: &Transaction) -> DoubleEntryRecord {
    let (negated, amount) = if txn.amount > 0.0 {
        (txn.amount, 0.0)
    } else {
        (0.0, txn.amount.abs())
    };
    DoubleEntryRecord {
        date: fmt(txn.post_date),
        description: txn.description.clone(),
        amount_negated: negated,
        amount,
        account: txn.card.liability_account().to_string(),
        target_account: txn.target_account.clone(),
    }
}

/// Collapse a batch of documents into the export record sets.
///
/// Failed documents are reported, never fatal; a cutoff drops whole
/// documents whose statement date falls before it. Main records sort by
/// transaction date (stable, so document order survives within a day); the
/// other sets follow that order.
pub fn finalize(documents: Vec<DocumentResult>, cutoff: Option<NaiveDate>) -> BatchOutput {
    let mut output = BatchOutput::default();
    let mut transactions: Vec<Transaction> = Vec::new();

    for doc in documents {
        if let Some(cut) = cutoff {
            if doc.statement_date < cut {
                output.skipped.push(doc.label);
                continue;
            }
        }

        match doc.outcome {
            Ok(parsed) => {
                output.reports.push(DocumentReport {
                    label: doc.label,
                    statement_date: doc.statement_date,
                    transactions: parsed.transactions.len(),
                    warnings: parsed.warnings,
                    error: None,
                });
                transactions.extend(parsed.transactions);
            }
            Err(err) => {
                output.reports.push(DocumentReport {
                    label: doc.label,
                    statement_date: doc.statement_date,
                    transactions: 0,
                    warnings: Vec::new(),
                    error: Some(err.to_string()),
                });
            }
        }
    }

    transactions.sort_by_key(|t| t.trans_date);

    for txn in &transactions {
        output.main.push(main_record(txn));
        output
            .per_card
            .entry(txn.card)
            .or_default()
            .push(card_record(txn));
        output.combined.push(combined_record(txn));
        output.double_entry.push(double_entry_record(txn));
    }

    output
}

/// File name for the main review export.
pub fn main_filename(ts: &str) -> String {
    format!("For Import Statement BPI Master {ts}.csv")
}

/// File name for one card's import export.
pub fn card_filename(card: CardKind, ts: &str) -> String {
    let tag = match card {
        CardKind::GoldRewards => "Gold",
        CardKind::ECredit => "e-credit",
        CardKind::Unknown => "Unknown",
    };
    format!("For Import Statement BPI Master {tag} {ts}.csv")
}

/// File name for the combined (both cards) import export.
pub fn combined_filename(ts: &str) -> String {
    format!("For Import Statement BPI Master Both {ts}.csv")
}
