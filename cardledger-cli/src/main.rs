use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

use cardledger_core::currency_symbol;
use cardledger_finance::{
    AccountCatalog, BatchOutput, DocumentResult, RuleSet, StatementPipeline, finalize, summarize,
};

mod config;
mod export;

/// Extracted-text statement files carry their statement date in the name.
const STATEMENT_FILE_PATTERN: &str = r"^Statement BPI Master (\d{4}-\d{2}-\d{2})\.txt$";

#[derive(Parser, Debug)]
#[command(name = "cardledger", version, about = "BPI statement parser and export tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default ~/.cardledger/config.toml
    InitConfig,

    /// Parse one extracted statement text file and write export CSVs
    Parse {
        /// Path to the extracted .txt statement
        input: PathBuf,

        /// Statement date (YYYY-MM-DD); taken from the file name when omitted
        #[arg(long)]
        statement_date: Option<NaiveDate>,

        /// Accounts-list CSV with a "Full Account Name" column
        #[arg(long)]
        accounts: Option<PathBuf>,

        /// Output folder for the export CSVs
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Write the combined file in double-entry (negated/amount) shape
        #[arg(long)]
        double_entry: bool,
    },

    /// Parse every statement file in a folder into one combined export
    Batch {
        /// Folder holding "Statement BPI Master YYYY-MM-DD.txt" files
        folder: Option<PathBuf>,

        /// Skip statements dated before this date (YYYY-MM-DD)
        #[arg(long)]
        cutoff: Option<NaiveDate>,

        /// Accounts-list CSV with a "Full Account Name" column
        #[arg(long)]
        accounts: Option<PathBuf>,

        /// Output folder for the export CSVs
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Write the combined file in double-entry (negated/amount) shape
        #[arg(long)]
        double_entry: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::InitConfig => {
            config::init_config()?;
        }

        Command::Parse {
            input,
            statement_date,
            accounts,
            out_dir,
            double_entry,
        } => {
            run_parse(&input, statement_date, accounts, out_dir, double_entry)?;
        }

        Command::Batch {
            folder,
            cutoff,
            accounts,
            out_dir,
            double_entry,
        } => {
            run_batch(folder, cutoff, accounts, out_dir, double_entry)?;
        }
    }

    Ok(())
}

fn statement_date_from_filename(path: &Path) -> Option<NaiveDate> {
    let name = path.file_name()?.to_str()?;
    let re = Regex::new(STATEMENT_FILE_PATTERN).ok()?;
    let caps = re.captures(name)?;
    NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok()
}

fn load_catalog(arg: Option<PathBuf>, cfg: &config::Config) -> Result<AccountCatalog> {
    let path = arg.or_else(|| cfg.paths.accounts_csv.as_ref().map(PathBuf::from));
    match path {
        Some(p) => AccountCatalog::load_csv(&p),
        None => Ok(AccountCatalog::default()),
    }
}

fn build_pipeline(catalog: AccountCatalog, cfg: &config::Config) -> Result<StatementPipeline> {
    StatementPipeline::with_fuzzy_threshold(
        catalog,
        &RuleSet::builtin(),
        cfg.classify.fuzzy_threshold,
    )
}

fn run_parse(
    input: &Path,
    statement_date: Option<NaiveDate>,
    accounts: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    double_entry: bool,
) -> Result<()> {
    let cfg = config::load_config()?;

    let Some(date) = statement_date.or_else(|| statement_date_from_filename(input)) else {
        bail!(
            "cannot determine statement date for {} (pass --statement-date YYYY-MM-DD)",
            input.display()
        );
    };

    let text =
        fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let pipeline = build_pipeline(load_catalog(accounts, &cfg)?, &cfg)?;

    let label = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());

    let parsed = pipeline
        .parse(&text, date)
        .with_context(|| format!("parsing {label}"))?;

    println!("Parsed {} transactions from {label}", parsed.transactions.len());
    print_warnings(&parsed.warnings);
    print_summary(&summarize(&parsed.transactions));

    let transactions = parsed.transactions.clone();
    let output = finalize(
        vec![DocumentResult {
            label,
            statement_date: date,
            outcome: Ok(parsed),
        }],
        None,
    );

    let out_dir = out_dir.unwrap_or_else(|| PathBuf::from(&cfg.paths.out_dir));
    let ts = date.format("%Y-%m-%d").to_string();
    let written = export::write_outputs(&output, &out_dir, &ts, double_entry)?;
    print_written(&written, transactions.len());

    Ok(())
}

fn run_batch(
    folder: Option<PathBuf>,
    cutoff: Option<NaiveDate>,
    accounts: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    double_entry: bool,
) -> Result<()> {
    let cfg = config::load_config()?;
    let folder = folder.unwrap_or_else(|| PathBuf::from(&cfg.paths.statements_dir));
    if !folder.is_dir() {
        bail!("not a folder: {}", folder.display());
    }

    let mut statements = find_statement_files(&folder)?;
    if statements.is_empty() {
        bail!(
            "no 'Statement BPI Master YYYY-MM-DD.txt' files in {}",
            folder.display()
        );
    }
    statements.sort_by_key(|(_, date)| *date);

    let pipeline = build_pipeline(load_catalog(accounts, &cfg)?, &cfg)?;

    let mut documents = Vec::new();
    let mut all_transactions = Vec::new();
    for (path, date) in statements {
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let outcome = match fs::read_to_string(&path) {
            Ok(text) => pipeline.parse(&text, date),
            Err(err) => Err(cardledger_core::ExtractionError::Unreadable(format!(
                "{}: {err}",
                path.display()
            ))),
        };

        if let Ok(parsed) = &outcome {
            if cutoff.is_none_or(|cut| date >= cut) {
                all_transactions.extend(parsed.transactions.iter().cloned());
            }
        }

        documents.push(DocumentResult {
            label,
            statement_date: date,
            outcome,
        });
    }

    let latest = documents
        .iter()
        .map(|d| d.statement_date)
        .max()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    let output = finalize(documents, cutoff);
    print_reports(&output);
    print_summary(&summarize(&all_transactions));

    let out_dir = out_dir.unwrap_or_else(|| PathBuf::from(&cfg.paths.out_dir));
    let written = export::write_outputs(&output, &out_dir, &latest, double_entry)?;
    print_written(&written, output.main.len());

    Ok(())
}

/// Collect statement files matching the expected name pattern.
fn find_statement_files(folder: &Path) -> Result<Vec<(PathBuf, NaiveDate)>> {
    let re = Regex::new(STATEMENT_FILE_PATTERN)?;
    let mut found = Vec::new();

    for entry in fs::read_dir(folder).with_context(|| format!("listing {}", folder.display()))? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        match re.captures(name) {
            Some(caps) => {
                if let Ok(date) = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d") {
                    found.push((path, date));
                }
            }
            None => {
                if name.ends_with(".txt") {
                    println!("Skipping unrecognized file name: {name}");
                }
            }
        }
    }

    Ok(found)
}

fn print_warnings(warnings: &[cardledger_core::Warning]) {
    for w in warnings {
        println!("  warning: {w}");
    }
}

fn print_reports(output: &BatchOutput) {
    println!("Documents:");
    for report in &output.reports {
        match &report.error {
            Some(err) => println!("  {} | FAILED: {err}", report.label),
            None => println!(
                "  {} | {} transactions, {} warning(s)",
                report.label,
                report.transactions,
                report.warnings.len()
            ),
        }
        print_warnings(&report.warnings);
    }
    for label in &output.skipped {
        println!("  {label} | skipped (before cutoff)");
    }
}

fn print_summary(summary: &cardledger_finance::BatchSummary) {
    if summary.transactions == 0 {
        println!("\nNo transactions to summarize");
        return;
    }

    println!("\nPer card:");
    for (card, s) in &summary.by_card {
        println!(
            "  {} | count={} charges={:.2} credits={:.2} net={:.2}",
            card.display_name(),
            s.count,
            s.charges,
            s.credits,
            s.total
        );
    }

    println!("\nPer currency:");
    for (code, s) in &summary.by_currency {
        let symbol = currency_symbol(code);
        match (s.avg_rate, s.min_rate, s.max_rate) {
            (Some(avg), Some(min), Some(max)) => println!(
                "  {code} | count={} local={:.2} foreign={symbol}{:.2} rate avg={avg:.4} min={min:.4} max={max:.4}",
                s.count, s.local_total, s.foreign_total
            ),
            _ => println!("  {code} | count={} local={:.2}", s.count, s.local_total),
        }
    }

    println!(
        "\nClassification: {}/{} auto-mapped ({:.1}%), {} for manual review",
        summary.auto_mapped, summary.transactions, summary.auto_mapped_pct, summary.manual_review
    );
    for (account, count) in &summary.by_account {
        println!("  {count:>4}  {account}");
    }
}

fn print_written(written: &[PathBuf], records: usize) {
    println!("\nWrote {records} records across {} file(s):", written.len());
    for path in written {
        println!("  {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_date_from_filename() {
        let path = PathBuf::from("/tmp/Statement BPI Master 2024-05-12.txt");
        assert_eq!(
            statement_date_from_filename(&path),
            NaiveDate::from_ymd_opt(2024, 5, 12)
        );
        assert_eq!(
            statement_date_from_filename(&PathBuf::from("notes.txt")),
            None
        );
        assert_eq!(
            statement_date_from_filename(&PathBuf::from("Statement BPI Master 2024-5-12.txt")),
            None
        );
    }
}
