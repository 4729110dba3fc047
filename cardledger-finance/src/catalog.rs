//! Account catalog and classification rule tables.
//!
//! Both are loaded once per run and read-only afterwards, so a batch can
//! process documents in parallel worker units without shared mutable state.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Account to assign when no rule matches.
pub const MANUAL_REVIEW_ACCOUNT: &str = "Manual Review";

/// Priority level in the classification cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleTier {
    #[serde(rename = "exact")]
    Exact,
    #[serde(rename = "fuzzy")]
    Fuzzy,
    #[serde(rename = "keyword")]
    Keyword,
}

/// One description-pattern-to-account rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub pattern: String,
    pub target: String,
    pub tier: RuleTier,
}

impl ClassificationRule {
    pub fn new(pattern: &str, target: &str, tier: RuleTier) -> Self {
        Self {
            pattern: pattern.to_string(),
            target: target.to_string(),
            tier,
        }
    }
}

/// Ordered rule table plus the default fallback account. Order matters for
/// keyword rules: the first match in table order wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<ClassificationRule>,
    pub fallback_account: String,
}

impl RuleSet {
    pub fn new(rules: Vec<ClassificationRule>, fallback_account: impl Into<String>) -> Self {
        Self {
            rules,
            fallback_account: fallback_account.into(),
        }
    }

    pub fn rules_for(&self, tier: RuleTier) -> Vec<ClassificationRule> {
        self.rules.iter().filter(|r| r.tier == tier).cloned().collect()
    }

    /// Built-in merchant mappings and keyword rules, curated from reviewed
    /// statements. Exact and fuzzy share the merchant table; fuzzy catches
    /// near-miss spellings of the same merchants.
    pub fn builtin() -> Self {
        let mut rules = Vec::new();

        for (pattern, target) in KNOWN_MAPPINGS {
            rules.push(ClassificationRule::new(pattern, target, RuleTier::Exact));
            rules.push(ClassificationRule::new(pattern, target, RuleTier::Fuzzy));
        }
        for (pattern, target) in KEYWORD_RULES {
            rules.push(ClassificationRule::new(pattern, target, RuleTier::Keyword));
        }

        Self::new(rules, MANUAL_REVIEW_ACCOUNT)
    }
}

/// Merchant descriptions with reviewed account assignments.
const KNOWN_MAPPINGS: [(&str, &str); 26] = [
    ("Apple.Com/Bill Itunes.Com", "Expenses:Entertainment:Music/Movies"),
    ("Payment -Thank You", "Liabilities:Credit Card:BPI Mastercard"),
    ("Metromart Makati", "Expenses:Food:Groceries"),
    ("Google *Youtubepremium", "Expenses:Entertainment:Music/Movies"),
    ("Audible*", "Expenses:Education:Books"),
    ("Nintendo Cd", "Expenses:Entertainment:Recreation"),
    ("Google *Minecraft", "Expenses:Entertainment:Recreation"),
    ("Scribd Inc*588895228 SanFrancisco", "Expenses:Professional Development & Productivity"),
    ("Google Cloud", "Expenses:Professional Development & Productivity"),
    ("Netflix.Com", "Expenses:Entertainment:Music/Movies"),
    ("Medium Monthly SanFrancisco", "Expenses:Professional Development & Productivity"),
    ("DJ*Wall-St-Journal", "Expenses:Education:Newspaper & Magazines"),
    ("DJ*Wsj", "Expenses:Education:Newspaper & Magazines"),
    ("Backblaze", "Expenses:Professional Development & Productivity"),
    ("Epic!Reading", "Expenses:Childcare:Books"),
    ("Grab Makati", "Expenses:Professional Fees"),
    ("AmznDigital*", "Expenses:Education:Books"),
    ("Epic! Reading", "Expenses:Childcare:Books"),
    ("Getepic.Com", "Expenses:Childcare:Books"),
    ("Paypal *Dotphdomain", "Assets:Investments:Investment in Business"),
    ("Reversal-Finance Charges", "Expenses:Banking Costs:Bank Service Charge"),
    ("Smart App", "Expenses:Utilities:Mobile"),
    ("TiezaNaiaT3", "Expenses:Travel:Fare"),
    ("Wsj/Barrons Subscripti", "Expenses:Education:Newspaper & Magazines"),
    ("Spotify", "Expenses:Entertainment:Music/Movies"),
    ("Lazada", "Expenses:Household Supplies"),
];

/// Substring keyword rules, first match in table order wins.
const KEYWORD_RULES: [(&str, &str); 41] = [
    ("apple", "Expenses:Entertainment:Music/Movies"),
    ("google", "Expenses:Professional Development & Productivity"),
    ("audible", "Expenses:Education:Books"),
    ("netflix", "Expenses:Entertainment:Music/Movies"),
    ("nintendo", "Expenses:Entertainment:Recreation"),
    ("amazon", "Expenses:Household Supplies"),
    ("scribd", "Expenses:Professional Development & Productivity"),
    ("medium", "Expenses:Professional Development & Productivity"),
    ("backblaze", "Expenses:Professional Development & Productivity"),
    ("microsoft", "Expenses:Professional Development & Productivity"),
    ("notion", "Expenses:Professional Development & Productivity"),
    ("lastpass", "Expenses:Professional Development & Productivity"),
    ("curiositystream", "Expenses:Entertainment:Music/Movies"),
    ("economist", "Expenses:Education:Newspaper & Magazines"),
    ("myfitnesspal", "Expenses:Health"),
    ("ground news", "Expenses:Education:Newspaper & Magazines"),
    ("hbogoasia", "Expenses:Entertainment:Music/Movies"),
    ("minecraft", "Expenses:Entertainment:Recreation"),
    ("shopee", "Expenses:Household Supplies"),
    ("lazada", "Expenses:Household Supplies"),
    ("shein", "Expenses:Clothes"),
    ("metromart", "Expenses:Food:Groceries"),
    ("grab", "Expenses:Professional Fees"),
    ("food panda", "Expenses:Food:Dining"),
    ("foodpanda", "Expenses:Food:Dining"),
    ("cafe", "Expenses:Food:Dining"),
    ("chicken", "Expenses:Food:Dining"),
    ("tonkatsu", "Expenses:Food:Dining"),
    ("grill", "Expenses:Food:Dining"),
    ("restaurant", "Expenses:Food:Dining"),
    ("taxumo", "Expenses:Professional Fees"),
    ("godaddy", "Assets:Investments:Investment in Business"),
    ("sharesight", "Expenses:Professional Development & Productivity"),
    ("meralco", "Expenses:Utilities:Electric"),
    ("s&r", "Expenses:Food:Groceries"),
    ("hotel", "Expenses:Travel:Hotel"),
    ("reversal", "Expenses:Banking Costs:Bank Service Charge"),
    ("barrons", "Expenses:Education:Newspaper & Magazines"),
    ("payment", "Liabilities:Credit Card:BPI Mastercard"),
    ("thank you", "Liabilities:Credit Card:BPI Mastercard"),
    ("finance charge", "Expenses:Banking Costs:Interest"),
];

/// The user's chart of accounts: an ordered list of valid account names,
/// read-only for the duration of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountCatalog {
    accounts: Vec<String>,
}

impl AccountCatalog {
    pub fn from_accounts(accounts: Vec<String>) -> Self {
        Self { accounts }
    }

    /// Load from an accounts-list CSV exported by the accounting system.
    /// The file must carry a "Full Account Name" column.
    pub fn load_csv(path: impl AsRef<Path>) -> Result<Self> {
        let mut rdr = csv::Reader::from_path(path.as_ref())
            .with_context(|| format!("opening {}", path.as_ref().display()))?;

        let headers = rdr.headers().context("reading accounts CSV header")?.clone();
        let Some(col) = headers.iter().position(|h| h.trim() == "Full Account Name") else {
            bail!("accounts CSV has no 'Full Account Name' column");
        };

        let mut accounts = Vec::new();
        for record in rdr.records() {
            let record = record?;
            if let Some(name) = record.get(col) {
                let name = name.trim();
                if !name.is_empty() {
                    accounts.push(name.to_string());
                }
            }
        }

        Ok(Self { accounts })
    }

    pub fn accounts(&self) -> &[String] {
        &self.accounts
    }

    pub fn expense_accounts(&self) -> impl Iterator<Item = &String> {
        self.accounts.iter().filter(|a| a.starts_with("Expenses:"))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.accounts.iter().any(|a| a == name)
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }
}
