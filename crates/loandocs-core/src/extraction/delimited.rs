use tracing::debug;

use crate::error::LoanDocsError;
use crate::extraction::{dedupe_headers, TableReader};
use crate::model::{CellValue, Table};
use crate::parsing::normalize_header;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads comma-separated UTF-8 files. All cells arrive as text.
pub struct CsvReader;

impl TableReader for CsvReader {
    fn read_table(&self, bytes: &[u8]) -> Result<Table, LoanDocsError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers = reader
            .headers()
            .map_err(|e| LoanDocsError::ParseError(format!("invalid csv header: {e}")))?
            .iter()
            .enumerate()
            .map(|(i, h)| normalize_header(h, i))
            .collect();

        let mut table = Table::new(dedupe_headers(headers));
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                LoanDocsError::ParseError(format!("invalid csv record {}: {e}", i + 1))
            })?;
            let cells: Vec<CellValue> = record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::text(field)
                    }
                })
                .collect();
            if cells.iter().all(CellValue::is_blank) {
                continue;
            }
            table.push_row(cells);
        }

        if table.columns.is_empty() {
            return Err(LoanDocsError::ParseError("no data found in csv".into()));
        }

        debug!(rows = table.len(), columns = table.columns.len(), "read csv");
        Ok(table)
    }

    fn backend_name(&self) -> &str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_header_and_rows() {
        let data = "\u{feff}사번,성명,입주예정일\n1001,김철수,2024-08-01\n,,\n1002,이영희,\n";
        let table = CsvReader.read_table(data.as_bytes()).unwrap();
        assert_eq!(table.columns, vec!["사번", "성명", "입주예정일"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 2), &CellValue::text("2024-08-01"));
        assert_eq!(table.cell(1, 2), &CellValue::Empty);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let data = "a,b,c\n1\n";
        let table = CsvReader.read_table(data.as_bytes()).unwrap();
        assert_eq!(table.rows[0].len(), 3);
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(CsvReader.read_table(b"").is_err());
    }
}
