pub mod delimited;
pub mod xlsx;

use std::path::Path;

use crate::error::LoanDocsError;
use crate::model::Table;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Suggested filename for the imminent-deadline listing.
pub const IMMINENT_FILENAME: &str = "imminent_submissions.xlsx";

/// A serialized table ready to hand back to the user.
#[derive(Debug, Clone)]
pub struct Download {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    /// Pick the format from a filename extension; anything but `.csv` is xlsx.
    pub fn from_filename(filename: &str) -> ExportFormat {
        let is_csv = Path::new(filename)
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if is_csv {
            ExportFormat::Csv
        } else {
            ExportFormat::Xlsx
        }
    }
}

/// Serialize `table` in the format implied by `filename`.
pub fn export(table: &Table, filename: &str) -> Result<Download, LoanDocsError> {
    match ExportFormat::from_filename(filename) {
        ExportFormat::Xlsx => Ok(Download {
            filename: filename.to_string(),
            content_type: XLSX_CONTENT_TYPE,
            bytes: xlsx::to_xlsx(table)?,
        }),
        ExportFormat::Csv => Ok(Download {
            filename: filename.to_string(),
            content_type: CSV_CONTENT_TYPE,
            bytes: delimited::to_csv(table)?,
        }),
    }
}

/// Workflow A download, named after the upload it annotates.
pub fn annotated_download(table: &Table, upload: &str) -> Result<Download, LoanDocsError> {
    export(table, &annotated_filename(upload))
}

/// Workflow B download under its fixed name.
pub fn imminent_download(table: &Table) -> Result<Download, LoanDocsError> {
    export(table, IMMINENT_FILENAME)
}

/// `대출현황.xlsx` -> `대출현황_deadlines.xlsx`
pub fn annotated_filename(upload: &str) -> String {
    let stem = Path::new(upload)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("upload");
    format!("{stem}_deadlines.xlsx")
}
