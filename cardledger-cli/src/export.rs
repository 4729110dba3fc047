//! CSV writers for the finalized record sets.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use cardledger_finance::{BatchOutput, card_filename, combined_filename, main_filename};

fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush().with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Write every non-empty record set of a batch into `out_dir` and return the
/// created paths. `double_entry` switches the combined "Both" file to the
/// two-column accounting shape.
pub fn write_outputs(
    output: &BatchOutput,
    out_dir: &Path,
    ts: &str,
    double_entry: bool,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir).with_context(|| format!("create {}", out_dir.display()))?;
    let mut written = Vec::new();

    if !output.main.is_empty() {
        let path = out_dir.join(main_filename(ts));
        write_records(&path, &output.main)?;
        written.push(path);
    }

    for (card, records) in &output.per_card {
        if records.is_empty() {
            continue;
        }
        let path = out_dir.join(card_filename(*card, ts));
        write_records(&path, records)?;
        written.push(path);
    }

    if !output.combined.is_empty() {
        let path = out_dir.join(combined_filename(ts));
        if double_entry {
            write_records(&path, &output.double_entry)?;
        } else {
            write_records(&path, &output.combined)?;
        }
        written.push(path);
    }

    Ok(written)
}
