//! Tiered account classification.
//!
//! Tiers are strategy objects evaluated in strict order; the first one that
//! produces a match wins. The default tier always matches, so every
//! description gets some account and some confidence. Adding a tier means
//! adding a strategy, not touching the existing ones.

use cardledger_core::{Alternative, ClassificationSource};

use crate::catalog::{AccountCatalog, RuleSet, RuleTier};

/// Fuzzy acceptance threshold (0-100). Tunable; 80 keeps the automatic
/// classification rate high without stealing matches from the keyword tier.
pub const DEFAULT_FUZZY_THRESHOLD: u8 = 80;

const EXACT_CONFIDENCE: u8 = 95;
const FUZZY_CONFIDENCE: u8 = 85;
const KEYWORD_CONFIDENCE: u8 = 60;
const DEFAULT_CONFIDENCE: u8 = 40;

/// Number of runner-up candidates surfaced on fuzzy matches.
const MAX_ALTERNATIVES: usize = 3;

/// Result of one classification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierMatch {
    pub account: String,
    pub confidence: u8,
    pub source: ClassificationSource,
    pub alternatives: Vec<Alternative>,
}

/// One level of the classification cascade.
trait ClassifyTier: Send + Sync {
    fn attempt(&self, description: &str) -> Option<ClassifierMatch>;
}

/// Case-insensitive containment of a reviewed merchant pattern.
struct ExactTier {
    mappings: Vec<(String, String)>,
}

impl ClassifyTier for ExactTier {
    fn attempt(&self, description: &str) -> Option<ClassifierMatch> {
        let desc = description.to_lowercase();
        self.mappings
            .iter()
            .find(|(pattern, _)| desc.contains(&pattern.to_lowercase()))
            .map(|(_, target)| ClassifierMatch {
                account: target.clone(),
                confidence: EXACT_CONFIDENCE,
                source: ClassificationSource::Exact,
                alternatives: Vec::new(),
            })
    }
}

/// Edit-distance similarity against the merchant patterns; catches slightly
/// mangled descriptions the exact tier misses.
struct FuzzyTier {
    mappings: Vec<(String, String)>,
    threshold: u8,
}

impl ClassifyTier for FuzzyTier {
    fn attempt(&self, description: &str) -> Option<ClassifierMatch> {
        let mut scored: Vec<(&str, u8)> = self
            .mappings
            .iter()
            .map(|(pattern, target)| (target.as_str(), similarity(description, pattern)))
            .collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        let (best_target, best_score) = *scored.first()?;
        if best_score < self.threshold {
            return None;
        }

        let mut alternatives = Vec::new();
        for (target, score) in scored.into_iter().skip(1) {
            if target == best_target || alternatives.iter().any(|a: &Alternative| a.account == target) {
                continue;
            }
            alternatives.push(Alternative {
                account: target.to_string(),
                score,
            });
            if alternatives.len() == MAX_ALTERNATIVES {
                break;
            }
        }

        Some(ClassifierMatch {
            account: best_target.to_string(),
            confidence: FUZZY_CONFIDENCE,
            source: ClassificationSource::Fuzzy,
            alternatives,
        })
    }
}

/// Substring keywords, first match in table order wins.
struct KeywordTier {
    rules: Vec<(String, String)>,
}

impl ClassifyTier for KeywordTier {
    fn attempt(&self, description: &str) -> Option<ClassifierMatch> {
        let desc = description.to_lowercase();
        self.rules
            .iter()
            .find(|(keyword, _)| desc.contains(&keyword.to_lowercase()))
            .map(|(_, target)| ClassifierMatch {
                account: target.clone(),
                confidence: KEYWORD_CONFIDENCE,
                source: ClassificationSource::Keyword,
                alternatives: Vec::new(),
            })
    }
}

/// Terminal tier: the configured fallback account, always a match.
struct DefaultTier {
    fallback: String,
}

impl ClassifyTier for DefaultTier {
    fn attempt(&self, _description: &str) -> Option<ClassifierMatch> {
        Some(ClassifierMatch {
            account: self.fallback.clone(),
            confidence: DEFAULT_CONFIDENCE,
            source: ClassificationSource::Default,
            alternatives: Vec::new(),
        })
    }
}

/// Maps transaction descriptions to accounts in the user's chart of
/// accounts. Read-only after construction.
pub struct AccountClassifier {
    tiers: Vec<Box<dyn ClassifyTier>>,
    fallback: String,
    catalog: AccountCatalog,
}

impl AccountClassifier {
    pub fn new(catalog: AccountCatalog, rules: &RuleSet) -> Self {
        Self::with_fuzzy_threshold(catalog, rules, DEFAULT_FUZZY_THRESHOLD)
    }

    pub fn with_fuzzy_threshold(catalog: AccountCatalog, rules: &RuleSet, threshold: u8) -> Self {
        let pairs = |tier: RuleTier| {
            rules
                .rules_for(tier)
                .into_iter()
                .map(|r| (r.pattern, r.target))
                .collect::<Vec<_>>()
        };

        let tiers: Vec<Box<dyn ClassifyTier>> = vec![
            Box::new(ExactTier {
                mappings: pairs(RuleTier::Exact),
            }),
            Box::new(FuzzyTier {
                mappings: pairs(RuleTier::Fuzzy),
                threshold,
            }),
            Box::new(KeywordTier {
                rules: pairs(RuleTier::Keyword),
            }),
            Box::new(DefaultTier {
                fallback: rules.fallback_account.clone(),
            }),
        ];

        Self {
            tiers,
            fallback: rules.fallback_account.clone(),
            catalog,
        }
    }

    /// Classify a description. Total: the default tier guarantees a result.
    pub fn classify(&self, description: &str) -> ClassifierMatch {
        for tier in &self.tiers {
            if let Some(m) = tier.attempt(description) {
                return m;
            }
        }
        // Only reachable with an empty tier list.
        ClassifierMatch {
            account: self.fallback.clone(),
            confidence: DEFAULT_CONFIDENCE,
            source: ClassificationSource::Default,
            alternatives: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &AccountCatalog {
        &self.catalog
    }
}

/// Levenshtein-ratio similarity in 0-100, case-insensitive.
pub fn similarity(a: &str, b: &str) -> u8 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 100;
    }
    let dist = levenshtein(&a, &b);
    (100 * (max_len - dist) / max_len) as u8
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
