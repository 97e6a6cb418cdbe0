use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::error::LoanDocsError;
use crate::model::{CellValue, Table, DATE_FORMAT};
use crate::parsing::serial::serial_from_datetime;

const MAX_XLSX_ROWS: usize = 1_048_576;
const MAX_XLSX_COLUMNS: usize = 16_384;

/// Serialize a table to xlsx bytes: a bold header row followed by the data.
///
/// Dates are written as real spreadsheet dates formatted `yyyy-mm-dd`, so
/// the file can be uploaded again without losing them.
pub fn to_xlsx(table: &Table) -> Result<Vec<u8>, LoanDocsError> {
    if table.len() + 1 > MAX_XLSX_ROWS {
        return Err(LoanDocsError::Export(format!(
            "{} rows exceed the xlsx limit",
            table.len()
        )));
    }
    if table.columns.len() > MAX_XLSX_COLUMNS {
        return Err(LoanDocsError::Export(format!(
            "{} columns exceed the xlsx limit",
            table.columns.len()
        )));
    }

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    let worksheet = workbook.add_worksheet();

    for (col, header) in table.columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, header, &header_format)
            .map_err(|e| {
                LoanDocsError::Export(format!("failed to write header '{}': {}", header, e))
            })?;
    }

    for (i, row) in table.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            write_cell(worksheet, r, col as u16, cell, &date_format, &datetime_format)
                .map_err(|e| {
                    LoanDocsError::Export(format!(
                        "failed to write row {} column '{}': {}",
                        i + 1,
                        table.columns.get(col).map(String::as_str).unwrap_or("?"),
                        e
                    ))
                })?;
        }
    }

    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| LoanDocsError::Export(format!("failed to freeze header: {}", e)))?;

    workbook
        .save_to_buffer()
        .map_err(|e| LoanDocsError::Export(format!("failed to save workbook: {}", e)))
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    date_format: &Format,
    datetime_format: &Format,
) -> Result<(), rust_xlsxwriter::XlsxError> {
    match cell {
        CellValue::Empty => {}
        CellValue::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        CellValue::Number(n) => {
            worksheet.write_number(row, col, *n)?;
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        CellValue::Date(d) => match d.and_hms_opt(0, 0, 0).and_then(serial_from_datetime) {
            Some(serial) => {
                worksheet.write_number_with_format(row, col, serial, date_format)?;
            }
            None => {
                worksheet.write_string(row, col, d.format(DATE_FORMAT).to_string())?;
            }
        },
        CellValue::DateTime(dt) => match serial_from_datetime(*dt) {
            Some(serial) => {
                worksheet.write_number_with_format(row, col, serial, datetime_format)?;
            }
            None => {
                worksheet.write_string(row, col, cell.to_string())?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_writes_zip_container() {
        let mut t = Table::new(vec!["성명".into(), "제출기한".into()]);
        t.push_row(vec![
            CellValue::text("김철수"),
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 10, 30).unwrap()),
        ]);
        let bytes = to_xlsx(&t).unwrap();
        assert!(bytes.starts_with(b"PK\x03\x04"));
    }

    #[test]
    fn test_empty_table_still_has_header() {
        let t = Table::new(vec!["성명".into()]);
        assert!(!to_xlsx(&t).unwrap().is_empty());
    }
}
