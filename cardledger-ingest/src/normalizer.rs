//! Repairs PDF-extraction artifacts line by line so the parser can rely on
//! stable token shapes.
//!
//! Extraction breaks tokens in three recurring ways: currency names split
//! around the dots ("U . S . Dollar"), month names fused to the day
//! ("October1"), and numerals split around separators ("2 , 337 . 48").
//! Each repair is a targeted substitution applied in a fixed order;
//! normalizing an already-normalized line is a no-op.

use anyhow::Result;
use regex::Regex;

const MONTH_ALTERNATION: &str = "January|February|March|April|May|June|July|August|September|October|November|December";

/// Single-line text normalizer. Compile once, use per line.
pub struct Normalizer {
    whitespace: Regex,
    usd_name: Regex,
    month_before_day: Regex,
    day_before_month: Regex,
    comma_split: Regex,
    dot_split: Regex,
    missing_amount_space: Regex,
}

impl Normalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            whitespace: Regex::new(r"\s+")?,
            // "U . S . Dollar", "US Dollar", "U.S Dollar", "U . S Dollar"
            usd_name: Regex::new(r"(?i)\bU\s*\.?\s*S\s*\.?\s*Dollar")?,
            month_before_day: Regex::new(&format!(r"(?i)\b({MONTH_ALTERNATION})(\d{{1,2}})\b"))?,
            day_before_month: Regex::new(&format!(r"(?i)\b(\d{{1,2}})({MONTH_ALTERNATION})\b"))?,
            comma_split: Regex::new(r"(\d+)\s*,\s*(\d+)")?,
            dot_split: Regex::new(r"(\d+)\s*\.\s*(\d+)")?,
            missing_amount_space: Regex::new(r"([A-Za-z])(-?\d{1,3}(?:,\d{3})*\.\d{2})$")?,
        })
    }

    /// Normalize one raw line. Pure; returns the input shape unchanged when
    /// no artifact is present.
    pub fn normalize_line(&self, line: &str) -> String {
        if line.trim().is_empty() {
            return String::new();
        }

        let text = self.whitespace.replace_all(line.trim(), " ").into_owned();
        let text = self.fix_currency_names(&text);
        let text = self.fix_month_spacing(&text);
        self.fix_amount_spacing(&text)
    }

    fn fix_currency_names(&self, text: &str) -> String {
        self.usd_name.replace_all(text, "U.S.Dollar").into_owned()
    }

    fn fix_month_spacing(&self, text: &str) -> String {
        // "October1" -> "October 1", "15September" -> "15 September"
        let text = self.month_before_day.replace_all(text, "$1 $2");
        self.day_before_month.replace_all(&text, "$1 $2").into_owned()
    }

    fn fix_amount_spacing(&self, text: &str) -> String {
        // "2 , 337 . 48" -> "2,337.48". Runs like "1 , 234 , 567" need a
        // second pass because the first match consumes the shared digits,
        // so iterate to a fixpoint.
        let mut current = text.to_string();
        loop {
            let next = self.comma_split.replace_all(&current, "$1,$2");
            let next = self.dot_split.replace_all(&next, "$1.$2").into_owned();
            if next == current {
                break;
            }
            current = next;
        }

        // "Spotify549.00" -> "Spotify 549.00" (only at end of line)
        self.missing_amount_space
            .replace(&current, "$1 $2")
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        Normalizer::new().unwrap()
    }

    #[test]
    fn test_collapses_whitespace() {
        let n = normalizer();
        assert_eq!(n.normalize_line("  May  1   May 2  "), "May 1 May 2");
        assert_eq!(n.normalize_line("\t\t"), "");
    }

    #[test]
    fn test_repairs_usd_name_variants() {
        let n = normalizer();
        for raw in [
            "U . S . Dollar 40.42 2,337.48",
            "US Dollar 40.42 2,337.48",
            "U.S Dollar 40.42 2,337.48",
            "U . S Dollar 40.42 2,337.48",
            "u.s.dollar 40.42 2,337.48",
        ] {
            assert_eq!(n.normalize_line(raw), "U.S.Dollar 40.42 2,337.48", "raw: {raw}");
        }
    }

    #[test]
    fn test_usd_repair_leaves_other_words_alone() {
        let n = normalizer();
        assert_eq!(n.normalize_line("CAMPUS Dollarama"), "CAMPUS Dollarama");
    }

    #[test]
    fn test_repairs_month_day_fusion() {
        let n = normalizer();
        assert_eq!(
            n.normalize_line("October1 October3 Netflix.Com 549.00"),
            "October 1 October 3 Netflix.Com 549.00"
        );
        assert_eq!(n.normalize_line("15September"), "15 September");
    }

    #[test]
    fn test_repairs_split_numerals() {
        let n = normalizer();
        assert_eq!(n.normalize_line("2 , 337 . 48"), "2,337.48");
        assert_eq!(n.normalize_line("1 , 234 , 567 . 89"), "1,234,567.89");
        assert_eq!(n.normalize_line("40 . 42"), "40.42");
    }

    #[test]
    fn test_inserts_space_before_trailing_amount() {
        let n = normalizer();
        assert_eq!(
            n.normalize_line("May 1 May 2 Spotify549.00"),
            "May 1 May 2 Spotify 549.00"
        );
    }

    #[test]
    fn test_idempotent_on_sampled_lines() {
        let n = normalizer();
        let samples = [
            "May1 May2 Payment -Thank You -13,544.89",
            "September 15 September 18 Backblaze.Com SanMateo US",
            "U . S . Dollar 40 . 42 2 , 337 . 48",
            "BPI GOLD REWARDS CARD",
            "1 , 234 , 567 . 89",
            "Previous Balance 12,000.00",
            "",
            "   spaced    out   line   ",
        ];
        for raw in samples {
            let once = n.normalize_line(raw);
            let twice = n.normalize_line(&once);
            assert_eq!(once, twice, "not idempotent for: {raw}");
        }
    }
}
