use crate::error::LoanDocsError;
use crate::model::Table;

/// Serialize to UTF-8 csv with a byte-order mark so spreadsheet apps pick
/// the right encoding for Hangul.
pub fn to_csv(table: &Table) -> Result<Vec<u8>, LoanDocsError> {
    let mut writer = csv::Writer::from_writer(b"\xEF\xBB\xBF".to_vec());

    writer
        .write_record(&table.columns)
        .map_err(|e| LoanDocsError::Export(format!("failed to write csv header: {e}")))?;

    for (i, row) in table.rows.iter().enumerate() {
        writer
            .write_record(row.iter().map(|c| c.to_string()))
            .map_err(|e| LoanDocsError::Export(format!("failed to write csv row {}: {e}", i + 1)))?;
    }

    writer
        .into_inner()
        .map_err(|e| LoanDocsError::Export(format!("failed to flush csv: {e}")))
}
