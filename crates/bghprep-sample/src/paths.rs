//! Input/output file layout for a (field, year) run

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::Config;

/// All files touched by one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    /// `{input}/{field}/{field}{year}.csv`
    pub input: PathBuf,
    /// `{output}/{field}/{field}{year}-UPW.jsonl` (gzipped after the run)
    pub metadata: PathBuf,
    /// `{output}/{field}/{field}{year}-PMC.txt`
    pub manifest: PathBuf,
    /// `{reports}/{field}/{field}{year}-dump.csv`
    pub dump: PathBuf,
}

impl RunPaths {
    pub fn new(config: &Config, year: u16) -> Self {
        let field = config.field.as_str();
        let stem = format!("{field}{year}");
        let output = config.output_dir.join(field);
        Self {
            input: config.input_dir.join(field).join(format!("{stem}.csv")),
            metadata: output.join(format!("{stem}-UPW.jsonl")),
            manifest: output.join(format!("{stem}-PMC.txt")),
            dump: config.reports_dir.join(field).join(format!("{stem}-dump.csv")),
        }
    }
}

/// `{reports}/{field}/{field}Report.csv`
pub fn report_path(config: &Config) -> PathBuf {
    config
        .reports_dir
        .join(&config.field)
        .join(format!("{}Report.csv", config.field))
}

/// Create the per-field output and report directories.
pub fn ensure_dirs(config: &Config) -> Result<()> {
    for dir in [
        config.output_dir.join(&config.field),
        config.reports_dir.join(&config.field),
    ] {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    Ok(())
}
