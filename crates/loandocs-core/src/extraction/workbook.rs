use std::io::Cursor;

use calamine::{Data, Ods, Range, Reader, Xls, Xlsb, Xlsx};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::error::LoanDocsError;
use crate::extraction::{concat_tables, dedupe_headers, SpreadsheetFormat, TableReader};
use crate::model::{CellValue, Table};
use crate::parsing::normalize_header;

/// Reads xlsx, xls, xlsb and ods workbooks through calamine.
pub struct WorkbookReader {
    format: SpreadsheetFormat,
}

impl WorkbookReader {
    pub fn new(format: SpreadsheetFormat) -> Self {
        WorkbookReader { format }
    }
}

impl TableReader for WorkbookReader {
    fn read_table(&self, bytes: &[u8]) -> Result<Table, LoanDocsError> {
        match self.format {
            SpreadsheetFormat::Xlsx => read_workbook::<Xlsx<_>>(bytes, self.format),
            SpreadsheetFormat::Xls => read_workbook::<Xls<_>>(bytes, self.format),
            SpreadsheetFormat::Xlsb => read_workbook::<Xlsb<_>>(bytes, self.format),
            SpreadsheetFormat::Ods => read_workbook::<Ods<_>>(bytes, self.format),
            SpreadsheetFormat::Csv => Err(LoanDocsError::UnsupportedFileFormat(
                "csv is not a workbook format".into(),
            )),
        }
    }

    fn backend_name(&self) -> &str {
        "calamine"
    }
}

/// Open a workbook and stack all of its sheets into one table.
fn read_workbook<'a, R>(bytes: &'a [u8], format: SpreadsheetFormat) -> Result<Table, LoanDocsError>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: std::fmt::Display,
{
    let mut workbook: R = calamine::open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| LoanDocsError::ParseError(format!("failed to open {format}: {e}")))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| LoanDocsError::ParseError(format!("sheet '{name}' unreadable: {e}")))?;
        match sheet_table(&range) {
            Some(table) => {
                debug!(sheet = %name, rows = table.len(), columns = table.columns.len(), "read sheet");
                sheets.push(table);
            }
            None => debug!(sheet = %name, "skipping empty sheet"),
        }
    }

    if sheets.is_empty() {
        return Err(LoanDocsError::ParseError(
            "no data found in workbook".into(),
        ));
    }

    Ok(concat_tables(sheets))
}

/// The first non-blank row is the header; blank rows after it are dropped.
fn sheet_table(range: &Range<Data>) -> Option<Table> {
    let mut rows = range
        .rows()
        .map(|r| r.iter().map(cell_value).collect::<Vec<_>>())
        .skip_while(|cells| cells.iter().all(CellValue::is_blank));

    let header_cells = rows.next()?;
    let headers = header_cells
        .iter()
        .enumerate()
        .map(|(i, c)| normalize_header(&c.to_string(), i))
        .collect();

    let mut table = Table::new(dedupe_headers(headers));
    for cells in rows {
        if cells.iter().all(CellValue::is_blank) {
            continue;
        }
        table.push_row(cells);
    }
    Some(table)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) if dt.is_duration() => CellValue::Number(dt.as_f64()),
        // as_datetime applies the 1904 offset when the workbook uses that system
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(v) if v.time() == NaiveTime::MIN => CellValue::Date(v.date()),
            Some(v) => CellValue::DateTime(v),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .map(CellValue::DateTime)
            .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d").map(CellValue::Date))
            .unwrap_or_else(|_| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        // #N/A, #REF! and friends carry no usable value
        Data::Error(_) => CellValue::Empty,
    }
}
