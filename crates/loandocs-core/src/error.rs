use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LoanDocsError {
    #[error("could not read '{value}' as a date")]
    UnparseableDate { value: String },

    #[error("required column '{column}' is missing from the uploaded table")]
    MissingColumn { column: String },

    #[error("unsupported file format: {0}. Upload an xlsx, xls, xlsb, ods or csv file.")]
    UnsupportedFileFormat(String),

    #[error("failed to read spreadsheet: {0}")]
    ParseError(String),

    #[error("failed to load ruleset from {path}: {reason}")]
    RulesetLoad { path: PathBuf, reason: String },

    #[error("invalid ruleset: {0}")]
    RulesetInvalid(String),

    #[error("failed to write output file: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LoanDocsError {
    pub(crate) fn missing_column(column: &str) -> Self {
        LoanDocsError::MissingColumn {
            column: column.to_string(),
        }
    }
}
