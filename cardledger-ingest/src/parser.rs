//! Line classifier and transaction parser.
//!
//! Expected extracted-text shape, after normalization:
//!
//! ```text
//! BPI GOLD REWARDS CARD
//! May 1 May 2 Payment -Thank You -13,544.89
//! September 15 September 18 Backblaze.Com SanMateo US
//! U.S.Dollar 40.42 2,337.48
//! ```
//!
//! A small state machine tracks which card section the cursor is in and
//! whether a foreign-currency transaction is waiting for its amounts line.
//! Content the parser cannot place is counted or warned about, never fatal;
//! only a document with no text at all raises [`ExtractionError`].

use anyhow::Result;
use regex::Regex;

use cardledger_core::{
    CardKind, ExtractionError, ForeignLeg, PartialDate, RawTransaction, Warning, month_from_name,
};

use crate::normalizer::Normalizer;

/// Everything derived from one document: transactions in document order,
/// warnings, and the count of in-section lines nothing matched.
#[derive(Debug)]
pub struct ParseOutcome {
    pub transactions: Vec<RawTransaction>,
    pub warnings: Vec<Warning>,
    pub unrecognized_lines: usize,
}

/// First line of a two-line foreign transaction, buffered until the amounts
/// line arrives.
#[derive(Debug, Clone)]
struct PendingForeign {
    trans_date: PartialDate,
    post_date: PartialDate,
    description: String,
    country_hint: String,
    line: String,
}

/// Parse position. Exactly one section context is active at any time;
/// transaction lines seen before the first header are rejected.
#[derive(Debug, Clone)]
enum State {
    NoCard,
    InCard(CardKind),
    PendingForeign { card: CardKind, first: PendingForeign },
}

/// Statement line parser. Compile once, reuse across documents.
pub struct LineParser {
    normalizer: Normalizer,
    skip_patterns: Vec<Regex>,
    single_line: Regex,
    foreign_first: Regex,
    foreign_second: Regex,
}

/// Section boundaries, page furniture and column-header echoes that carry
/// no transaction data.
const SKIP_PATTERNS: [&str; 10] = [
    r"(?i)Statement of Account",
    r"(?i)Customer Number",
    r"(?i)Previous Balance",
    r"(?i)Past Due",
    r"(?i)Ending Balance",
    r"(?i)Unbilled Installment",
    r"(?i)^Finance Charge\s+\d",
    r"(?i)Transaction\s+Post.*Date",
    r"^\d{6}-\d-\d{2}-\d{7}",
    r"(?i)^(Date|Transaction|Post Date|Description|Amount)\s*$",
];

const GOLD_HEADER_KEYS: [&str; 3] = [
    "BPIGOLDREWARDS",
    "GOLDREWARDS",
    "BPIEXPRESSCREDITGOLDMASTERCARD",
];
const ECREDIT_HEADER_KEYS: [&str; 2] = ["BPIECREDIT", "ECREDITCARD"];

/// Card header detection, tolerant of the documented spacing/punctuation
/// variants of the two card names.
fn detect_header(line: &str) -> Option<CardKind> {
    let upper = line.to_uppercase();
    let squeezed: String = upper.chars().filter(|c| !c.is_whitespace()).collect();

    if GOLD_HEADER_KEYS.iter().any(|k| squeezed.contains(k)) {
        return Some(CardKind::GoldRewards);
    }

    let dehyphened: String = squeezed.chars().filter(|c| *c != '-').collect();
    if !upper.contains("GOLD") && ECREDIT_HEADER_KEYS.iter().any(|k| dehyphened.contains(k)) {
        return Some(CardKind::ECredit);
    }

    None
}

fn parse_amount(s: &str) -> f64 {
    s.replace(',', "").parse().unwrap_or(0.0)
}

impl LineParser {
    pub fn new() -> Result<Self> {
        let skip_patterns = SKIP_PATTERNS
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            normalizer: Normalizer::new()?,
            skip_patterns,
            // Month Day Month Day Description Amount
            single_line: Regex::new(concat!(
                r"^(?P<tmon>[A-Za-z]+)\s+(?P<tday>\d{1,2})\s+",
                r"(?P<pmon>[A-Za-z]+)\s+(?P<pday>\d{1,2})\s+",
                r"(?P<desc>.+?)\s+",
                r"(?P<amount>-?\d{1,3}(?:,\d{3})*\.\d{2})$"
            ))?,
            // Month Day Month Day Description CountryHint (no amount)
            foreign_first: Regex::new(concat!(
                r"^(?P<tmon>[A-Za-z]+)\s+(?P<tday>\d{1,2})\s+",
                r"(?P<pmon>[A-Za-z]+)\s+(?P<pday>\d{1,2})\s+",
                r"(?P<desc>.+?)\s+",
                r"(?P<hint>[A-Z]{2,3})$"
            ))?,
            // CurrencyName ForeignAmount LocalAmount
            foreign_second: Regex::new(concat!(
                r"^(?P<name>[A-Za-z][A-Za-z. ]*?)\s+",
                r"(?P<foreign>\d[\d,]*(?:\.\d+)?)\s+",
                r"(?P<local>-?\d{1,3}(?:,\d{3})*\.\d{2})$"
            ))?,
        })
    }

    /// Parse one document's extracted text into raw transactions.
    ///
    /// Fails only for a document with no content at all. Transactions come
    /// out in document line order within each card section; nothing is
    /// deduplicated or reordered here.
    pub fn parse(&self, text: &str) -> std::result::Result<ParseOutcome, ExtractionError> {
        let mut transactions = Vec::new();
        let mut warnings = Vec::new();
        let mut unrecognized = 0usize;
        let mut state = State::NoCard;
        let mut saw_content = false;

        for raw_line in text.lines() {
            let line = self.normalizer.normalize_line(raw_line);
            if line.is_empty() {
                continue;
            }
            saw_content = true;
            state = self.step(state, &line, &mut transactions, &mut warnings, &mut unrecognized);
        }

        if let State::PendingForeign { first, .. } = state {
            warnings.push(Warning::Parse(format!(
                "document ended while waiting for foreign amounts after '{}'",
                first.line
            )));
        }

        if !saw_content {
            return Err(ExtractionError::EmptyDocument);
        }
        if transactions.is_empty() {
            warnings.push(Warning::Parse(
                "no transactions recognized in document".to_string(),
            ));
        }
        if unrecognized > 0 {
            warnings.push(Warning::Parse(format!(
                "{unrecognized} unrecognized line(s) inside card sections"
            )));
        }

        Ok(ParseOutcome {
            transactions,
            warnings,
            unrecognized_lines: unrecognized,
        })
    }

    fn step(
        &self,
        state: State,
        line: &str,
        out: &mut Vec<RawTransaction>,
        warnings: &mut Vec<Warning>,
        unrecognized: &mut usize,
    ) -> State {
        // A buffered foreign first-line claims the very next line; on a
        // mismatch the pending line is dropped with a warning and the
        // current line is handled normally below.
        let card_ctx: Option<CardKind> = match state {
            State::PendingForeign { card, first } => {
                if let Some(caps) = self.foreign_second.captures(line) {
                    out.push(RawTransaction {
                        card,
                        trans_date: first.trans_date,
                        post_date: first.post_date,
                        description: first.description,
                        amount: parse_amount(&caps["local"]),
                        foreign: Some(ForeignLeg {
                            country_hint: first.country_hint,
                            currency_name: caps["name"].trim().to_string(),
                            amount: parse_amount(&caps["foreign"]),
                        }),
                    });
                    return State::InCard(card);
                }
                warnings.push(Warning::Parse(format!(
                    "expected foreign amounts after '{}', got '{}'; pending line discarded",
                    first.line, line
                )));
                Some(card)
            }
            State::InCard(card) => Some(card),
            State::NoCard => None,
        };

        if let Some(card) = detect_header(line) {
            return State::InCard(card);
        }

        if self.should_skip(line) {
            return match card_ctx {
                Some(card) => State::InCard(card),
                None => State::NoCard,
            };
        }

        match card_ctx {
            None => {
                // No section context yet: reject transaction-shaped lines
                // loudly, ignore the rest of the preamble quietly.
                if self.match_single(line, CardKind::Unknown).is_some()
                    || self.match_foreign_first(line).is_some()
                {
                    warnings.push(Warning::Parse(format!(
                        "transaction line before any card header: '{line}'"
                    )));
                }
                State::NoCard
            }
            Some(card) => {
                if let Some(txn) = self.match_single(line, card) {
                    out.push(txn);
                    return State::InCard(card);
                }
                if let Some(first) = self.match_foreign_first(line) {
                    return State::PendingForeign { card, first };
                }
                *unrecognized += 1;
                State::InCard(card)
            }
        }
    }

    fn should_skip(&self, line: &str) -> bool {
        self.skip_patterns.iter().any(|re| re.is_match(line))
    }

    fn match_single(&self, line: &str, card: CardKind) -> Option<RawTransaction> {
        let caps = self.single_line.captures(line)?;
        let trans_date = partial_date(&caps["tmon"], &caps["tday"])?;
        let post_date = partial_date(&caps["pmon"], &caps["pday"])?;

        Some(RawTransaction {
            card,
            trans_date,
            post_date,
            description: caps["desc"].trim().to_string(),
            amount: parse_amount(&caps["amount"]),
            foreign: None,
        })
    }

    fn match_foreign_first(&self, line: &str) -> Option<PendingForeign> {
        let caps = self.foreign_first.captures(line)?;
        let trans_date = partial_date(&caps["tmon"], &caps["tday"])?;
        let post_date = partial_date(&caps["pmon"], &caps["pday"])?;

        // The hint stays in the description; it is part of the merchant
        // line as printed.
        Some(PendingForeign {
            trans_date,
            post_date,
            description: format!("{} {}", caps["desc"].trim(), &caps["hint"]),
            country_hint: caps["hint"].to_string(),
            line: line.to_string(),
        })
    }
}

fn partial_date(month_name: &str, day: &str) -> Option<PartialDate> {
    let month = month_from_name(month_name)?;
    let day: u32 = day.parse().ok()?;
    Some(PartialDate::new(month, day))
}
