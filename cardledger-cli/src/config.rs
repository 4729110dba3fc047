use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use cardledger_finance::classifier::DEFAULT_FUZZY_THRESHOLD;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsSection,
    pub classify: ClassifySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsSection {
    /// Folder scanned by `cardledger batch` when none is given.
    pub statements_dir: String,
    /// Folder the export CSVs are written to.
    pub out_dir: String,
    /// Optional accounts-list CSV ("Full Account Name" column).
    pub accounts_csv: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifySection {
    /// Fuzzy-match acceptance threshold, 0-100.
    pub fuzzy_threshold: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsSection {
                statements_dir: ".".to_string(),
                out_dir: ".".to_string(),
                accounts_csv: None,
            },
            classify: ClassifySection {
                fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            },
        }
    }
}

pub fn cardledger_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".cardledger"))
}

pub fn ensure_cardledger_home() -> Result<PathBuf> {
    let dir = cardledger_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_cardledger_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let cfg = Config::default();
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}
