//! Batch summaries for CLI reporting: per-card totals, per-currency
//! breakdowns and the classification quality numbers a reviewer scans
//! before opening the export.

use std::collections::BTreeMap;

use cardledger_core::{CardKind, ClassificationSource, Transaction};

/// Counts and totals for one card's transactions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardSummary {
    pub count: usize,
    /// Signed sum in the home currency.
    pub total: f64,
    pub charges: f64,
    pub credits: f64,
}

/// Breakdown for one currency seen in the batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrencySummary {
    pub count: usize,
    pub local_total: f64,
    pub foreign_total: f64,
    pub min_rate: Option<f64>,
    pub max_rate: Option<f64>,
    pub avg_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub transactions: usize,
    pub by_card: BTreeMap<CardKind, CardSummary>,
    pub by_currency: BTreeMap<String, CurrencySummary>,
    /// Transactions the classifier placed somewhere other than the fallback.
    pub auto_mapped: usize,
    /// Transactions left on the fallback account for a reviewer.
    pub manual_review: usize,
    pub auto_mapped_pct: f64,
    /// Transactions per target account.
    pub by_account: BTreeMap<String, usize>,
}

/// Summarize finalized transactions. Pure aggregation; the slice is usually
/// every transaction a batch produced.
pub fn summarize(transactions: &[Transaction]) -> BatchSummary {
    let mut summary = BatchSummary {
        transactions: transactions.len(),
        ..BatchSummary::default()
    };

    let mut rate_sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();

    for txn in transactions {
        let card = summary.by_card.entry(txn.card).or_default();
        card.count += 1;
        card.total += txn.amount;
        if txn.amount > 0.0 {
            card.charges += txn.amount;
        } else {
            card.credits += txn.amount;
        }

        let cur = summary.by_currency.entry(txn.currency.clone()).or_default();
        cur.count += 1;
        cur.local_total += txn.amount;
        if let Some(foreign) = txn.foreign_amount {
            cur.foreign_total += foreign;
        }
        if let Some(rate) = txn.exchange_rate {
            cur.min_rate = Some(cur.min_rate.map_or(rate, |m| m.min(rate)));
            cur.max_rate = Some(cur.max_rate.map_or(rate, |m| m.max(rate)));
            let (sum, n) = rate_sums.entry(txn.currency.clone()).or_default();
            *sum += rate;
            *n += 1;
        }

        if txn.source == ClassificationSource::Default {
            summary.manual_review += 1;
        } else {
            summary.auto_mapped += 1;
        }
        *summary
            .by_account
            .entry(txn.target_account.clone())
            .or_default() += 1;
    }

    for (code, (sum, n)) in rate_sums {
        if let Some(cur) = summary.by_currency.get_mut(&code) {
            cur.avg_rate = Some(sum / n as f64);
        }
    }

    if summary.transactions > 0 {
        summary.auto_mapped_pct = summary.auto_mapped as f64 / summary.transactions as f64 * 100.0;
    }

    summary
}
