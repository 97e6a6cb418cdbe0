pub mod error;
pub mod evaluate;
pub mod export;
pub mod extraction;
pub mod imminent;
pub mod model;
pub mod parsing;
pub mod rules;

use tracing::info;

use error::LoanDocsError;
use evaluate::Evaluation;
use extraction::{SpreadsheetFormat, TableReader};
use imminent::ImminentOutcome;
use model::Table;
use rules::schema::RuleSetDef;

pub use evaluate::EvaluateOptions;
pub use imminent::ImminentOptions;

/// Read an upload into a uniform table, picking the reader from the
/// filename and content.
pub fn read_upload(filename: &str, bytes: &[u8]) -> Result<Table, LoanDocsError> {
    let format = SpreadsheetFormat::detect(filename, bytes)?;
    let reader = format.reader();
    read_with(reader.as_ref(), filename, bytes)
}

/// Read an upload with an explicit reader.
pub fn read_with(
    reader: &dyn TableReader,
    filename: &str,
    bytes: &[u8],
) -> Result<Table, LoanDocsError> {
    let table = reader.read_table(bytes)?;
    info!(
        file = filename,
        backend = reader.backend_name(),
        rows = table.len(),
        columns = table.columns.len(),
        "upload read"
    );
    Ok(table)
}

/// Workflow A: derive deadlines and status for every record of an upload.
pub fn annotate_upload(
    filename: &str,
    bytes: &[u8],
    ruleset: &RuleSetDef,
    options: &EvaluateOptions,
) -> Result<Evaluation, LoanDocsError> {
    let table = read_upload(filename, bytes)?;
    evaluate::evaluate(&table, ruleset, options)
}

/// Workflow B: list the deadlines falling due inside the window.
///
/// With `evaluate_first` the deadlines are derived before filtering; without
/// it the upload must already carry the deadline columns.
pub fn imminent_from_upload(
    filename: &str,
    bytes: &[u8],
    ruleset: &RuleSetDef,
    options: &ImminentOptions,
    evaluate_first: bool,
) -> Result<ImminentOutcome, LoanDocsError> {
    let table = read_upload(filename, bytes)?;
    imminent_from_table(&table, ruleset, options, evaluate_first)
}

/// Same as [`imminent_from_upload`] for a table that is already in memory.
pub fn imminent_from_table(
    table: &Table,
    ruleset: &RuleSetDef,
    options: &ImminentOptions,
    evaluate_first: bool,
) -> Result<ImminentOutcome, LoanDocsError> {
    if evaluate_first {
        let evaluated =
            evaluate::evaluate(table, ruleset, &EvaluateOptions::new(options.today))?;
        imminent::extract_imminent(&evaluated.table, ruleset, options)
    } else {
        imminent::extract_imminent(table, ruleset, options)
    }
}
