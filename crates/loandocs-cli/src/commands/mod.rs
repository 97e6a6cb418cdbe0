pub mod annotate;
pub mod date;
pub mod imminent;
pub mod rules;

use chrono::{Local, NaiveDate};
use clap::Args;
use loandocs_core::error::LoanDocsError;
use loandocs_core::export::{export, Download};
use loandocs_core::model::Table;
use loandocs_core::parsing::DateNormalizer;
use loandocs_core::rules::builtin;
use loandocs_core::rules::schema::RuleSetDef;
use std::path::{Path, PathBuf};

/// Ruleset selection shared by the evaluating subcommands.
#[derive(Args)]
pub struct RuleArgs {
    /// Custom JSON rule file (takes precedence over --preset)
    #[arg(short, long = "rules", value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Predefined ruleset (default: housing-loan)
    #[arg(short, long = "preset", value_name = "NAME")]
    pub preset: Option<String>,
}

impl RuleArgs {
    pub fn load(&self) -> Result<RuleSetDef, LoanDocsError> {
        match (&self.rules, &self.preset) {
            (Some(path), _) => loandocs_core::rules::load_ruleset(path),
            (None, Some(name)) => builtin::load_preset(name),
            (None, None) => builtin::load_preset(builtin::DEFAULT_PRESET),
        }
    }
}

/// Parse `--today`; any layout the date normalizer accepts is fine.
pub fn reference_date(today: Option<&str>) -> Result<NaiveDate, LoanDocsError> {
    let local = Local::now().date_naive();
    match today {
        Some(raw) => DateNormalizer::new(local).normalize_str(raw).require(),
        None => Ok(local),
    }
}

/// Read an upload from disk, keeping the filename for format detection.
pub fn read_input(path: &Path) -> Result<(String, Vec<u8>), LoanDocsError> {
    let bytes = std::fs::read(path)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok((filename, bytes))
}

/// Write `table` to `out`. A directory receives the suggested download,
/// anything else is written as named, xlsx or csv by extension.
pub fn save_export(
    out: &Path,
    table: &Table,
    suggested: impl FnOnce(&Table) -> Result<Download, LoanDocsError>,
) -> Result<PathBuf, LoanDocsError> {
    let (target, download) = if out.is_dir() {
        let download = suggested(table)?;
        (out.join(&download.filename), download)
    } else {
        (out.to_path_buf(), export(table, &out.to_string_lossy())?)
    };
    std::fs::write(&target, &download.bytes)?;
    Ok(target)
}
