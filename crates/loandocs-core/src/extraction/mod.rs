pub mod delimited;
pub mod workbook;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::error::LoanDocsError;
use crate::model::{CellValue, Table};

/// Trait for spreadsheet reading backends.
pub trait TableReader: Send + Sync {
    /// Read every sheet of an upload into one uniform table.
    fn read_table(&self, bytes: &[u8]) -> Result<Table, LoanDocsError>;

    /// Name of this reading backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    Xlsx,
    Xls,
    Xlsb,
    Ods,
    Csv,
}

impl fmt::Display for SpreadsheetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpreadsheetFormat::Xlsx => write!(f, "xlsx"),
            SpreadsheetFormat::Xls => write!(f, "xls"),
            SpreadsheetFormat::Xlsb => write!(f, "xlsb"),
            SpreadsheetFormat::Ods => write!(f, "ods"),
            SpreadsheetFormat::Csv => write!(f, "csv"),
        }
    }
}

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

impl SpreadsheetFormat {
    pub fn from_extension(ext: &str) -> Option<SpreadsheetFormat> {
        match ext.to_lowercase().as_str() {
            "xlsx" | "xlsm" => Some(SpreadsheetFormat::Xlsx),
            "xls" => Some(SpreadsheetFormat::Xls),
            "xlsb" => Some(SpreadsheetFormat::Xlsb),
            "ods" => Some(SpreadsheetFormat::Ods),
            "csv" => Some(SpreadsheetFormat::Csv),
            _ => None,
        }
    }

    /// Guess the format from the leading bytes. Zip containers are assumed
    /// to be xlsx.
    pub fn sniff(bytes: &[u8]) -> Option<SpreadsheetFormat> {
        if bytes.starts_with(ZIP_MAGIC) {
            Some(SpreadsheetFormat::Xlsx)
        } else if bytes.starts_with(OLE_MAGIC) {
            Some(SpreadsheetFormat::Xls)
        } else {
            None
        }
    }

    /// Detect the format of an upload: extension first, then magic bytes.
    pub fn detect(filename: &str, bytes: &[u8]) -> Result<SpreadsheetFormat, LoanDocsError> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        SpreadsheetFormat::from_extension(ext)
            .or_else(|| SpreadsheetFormat::sniff(bytes))
            .ok_or_else(|| {
                let shown = if ext.is_empty() {
                    format!("'{filename}' (no extension, unrecognized content)")
                } else {
                    format!("'.{ext}'")
                };
                LoanDocsError::UnsupportedFileFormat(shown)
            })
    }

    pub fn reader(self) -> Box<dyn TableReader> {
        match self {
            SpreadsheetFormat::Csv => Box::new(delimited::CsvReader),
            other => Box::new(workbook::WorkbookReader::new(other)),
        }
    }
}

/// Concatenate sheet tables. Columns are the union of all headers in
/// first-seen order; cells a sheet lacks stay empty.
pub fn concat_tables(tables: Vec<Table>) -> Table {
    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for table in &tables {
        for name in &table.columns {
            if !positions.contains_key(name) {
                positions.insert(name.clone(), columns.len());
                columns.push(name.clone());
            }
        }
    }

    let mut merged = Table::new(columns);
    for table in tables {
        let mapping: Vec<usize> = table.columns.iter().map(|c| positions[c]).collect();
        for row in table.rows {
            let mut cells = vec![CellValue::Empty; merged.columns.len()];
            for (cell, &target) in row.into_iter().zip(&mapping) {
                cells[target] = cell;
            }
            merged.push_row(cells);
        }
    }
    merged
}

/// Suffix repeated header names with `.1`, `.2`, ... so every column is addressable.
pub(crate) fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .map(|h| {
            let n = counts.entry(h.clone()).or_insert(0);
            let name = if *n == 0 { h } else { format!("{h}.{n}") };
            *n += 1;
            name
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(
            SpreadsheetFormat::detect("대출현황.XLSX", &[]).unwrap(),
            SpreadsheetFormat::Xlsx
        );
        assert_eq!(
            SpreadsheetFormat::detect("list.csv", b"PK\x03\x04").unwrap(),
            SpreadsheetFormat::Csv
        );
    }

    #[test]
    fn test_detect_by_magic_bytes() {
        assert_eq!(
            SpreadsheetFormat::detect("upload", b"PK\x03\x04rest").unwrap(),
            SpreadsheetFormat::Xlsx
        );
        assert_eq!(
            SpreadsheetFormat::detect("upload.bin", OLE_MAGIC).unwrap(),
            SpreadsheetFormat::Xls
        );
    }

    #[test]
    fn test_unsupported_format() {
        let err = SpreadsheetFormat::detect("notes.txt", b"hello").unwrap_err();
        assert!(matches!(err, LoanDocsError::UnsupportedFileFormat(_)));
        assert!(err.to_string().contains(".txt"));
    }

    #[test]
    fn test_concat_unions_columns() {
        let mut a = Table::new(vec!["사번".into(), "성명".into()]);
        a.push_row(vec![CellValue::text("1"), CellValue::text("김")]);
        let mut b = Table::new(vec!["성명".into(), "직위".into()]);
        b.push_row(vec![CellValue::text("이"), CellValue::text("과장")]);

        let merged = concat_tables(vec![a, b]);
        assert_eq!(merged.columns, vec!["사번", "성명", "직위"]);
        assert_eq!(merged.rows[0][2], CellValue::Empty);
        assert_eq!(merged.rows[1][0], CellValue::Empty);
        assert_eq!(merged.rows[1][1], CellValue::text("이"));
    }

    #[test]
    fn test_dedupe_headers() {
        let headers = dedupe_headers(vec!["a".into(), "b".into(), "a".into(), "a".into()]);
        assert_eq!(headers, vec!["a", "b", "a.1", "a.2"]);
    }
}
