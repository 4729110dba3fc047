//! Currency identification and exchange-rate derivation.
//!
//! Foreign transactions carry a country hint on the first line ("US") and a
//! currency name on the second ("U.S.Dollar"). Both are mapped to ISO-style
//! codes; an unrecognized name is passed through as a literal code with a
//! warning, never coerced to the home currency.

use crate::error::Warning;
use crate::types::ForeignLeg;

/// Statement home currency. BPI bills everything in Philippine pesos.
pub const HOME_CURRENCY: &str = "PHP";

/// Currency names seen on the second line of foreign transactions, keyed by
/// the name with spaces and dots removed, uppercased. The normalizer repairs
/// most extraction splits before this table is consulted; stripping
/// separators here absorbs the rest.
const CURRENCY_NAMES: [(&str, &str); 3] = [
    ("USDOLLAR", "USD"),
    ("SINGAPOREDOLLAR", "SGD"),
    ("NEWZEALANDDOLLAR", "NZD"),
];

/// Country hints from the tail of the first foreign line.
const COUNTRY_HINTS: [(&str, &str); 3] = [("US", "USD"), ("SG", "SGD"), ("NZ", "NZD")];

const CURRENCY_SYMBOLS: [(&str, &str); 13] = [
    ("PHP", "\u{20b1}"),
    ("USD", "$"),
    ("EUR", "\u{20ac}"),
    ("GBP", "\u{a3}"),
    ("JPY", "\u{a5}"),
    ("SGD", "S$"),
    ("NZD", "NZ$"),
    ("CAD", "CA$"),
    ("AUD", "A$"),
    ("CHF", "CHF"),
    ("THB", "\u{e3f}"),
    ("HKD", "HK$"),
    ("KRW", "\u{20a9}"),
];

/// Currency code plus an optional quality warning when the code is a
/// passthrough of an unrecognized name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCurrency {
    pub code: String,
    pub warning: Option<Warning>,
}

fn strip_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect::<String>()
        .to_uppercase()
}

/// ISO-style code for a currency name, tolerating spacing/dot variants.
pub fn code_for_name(name: &str) -> Option<&'static str> {
    let key = strip_name(name);
    CURRENCY_NAMES
        .iter()
        .find(|(n, _)| *n == key)
        .map(|(_, code)| *code)
}

/// ISO-style code for a first-line country hint.
pub fn code_for_country_hint(hint: &str) -> Option<&'static str> {
    COUNTRY_HINTS
        .iter()
        .find(|(h, _)| h.eq_ignore_ascii_case(hint.trim()))
        .map(|(_, code)| *code)
}

/// Display symbol for a code; falls back to the code itself.
pub fn currency_symbol(code: &str) -> &str {
    CURRENCY_SYMBOLS
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, s)| *s)
        .unwrap_or(code)
}

/// Effective exchange rate: home amount per unit of foreign currency,
/// rounded to 4 decimal places. A zero foreign amount yields None rather
/// than a division.
pub fn exchange_rate(local_amount: f64, foreign_amount: f64) -> Option<f64> {
    if foreign_amount == 0.0 {
        return None;
    }
    Some((local_amount / foreign_amount * 10_000.0).round() / 10_000.0)
}

/// Determine the currency for a transaction. No foreign leg means the home
/// currency; otherwise the currency name decides, the country hint breaks
/// ties, and anything unrecognized passes through with a warning.
pub fn resolve(foreign: Option<&ForeignLeg>) -> ResolvedCurrency {
    let Some(leg) = foreign else {
        return ResolvedCurrency {
            code: HOME_CURRENCY.to_string(),
            warning: None,
        };
    };

    if let Some(code) = code_for_name(&leg.currency_name) {
        return ResolvedCurrency {
            code: code.to_string(),
            warning: None,
        };
    }
    if let Some(code) = code_for_country_hint(&leg.country_hint) {
        return ResolvedCurrency {
            code: code.to_string(),
            warning: None,
        };
    }

    let literal = if leg.currency_name.trim().is_empty() {
        leg.country_hint.trim().to_string()
    } else {
        leg.currency_name.trim().to_string()
    };
    ResolvedCurrency {
        code: literal.clone(),
        warning: Some(Warning::Currency(format!(
            "unrecognized currency '{literal}', kept as-is"
        ))),
    }
}
