use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LoanDocsError;

/// Display format for every date the engine writes.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single spreadsheet cell, independent of the file format it came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(String),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> CellValue {
        CellValue::Text(s.into())
    }

    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            // Integral numbers (employee ids, serials) print without ".0"
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// An in-memory table with named columns. Every row is as wide as the header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Table {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding with empty cells or truncating to the header width.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Look up a column by exact name, failing with `MissingColumn`.
    pub fn require_column(&self, name: &str) -> Result<usize, LoanDocsError> {
        self.column_index(name)
            .ok_or_else(|| LoanDocsError::missing_column(name))
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&CellValue::Empty)
    }
}

/// The value of one derived deadline field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineValue {
    Due(NaiveDate),
    NotApplicable,
}

impl DeadlineValue {
    pub fn is_applicable(&self) -> bool {
        matches!(self, DeadlineValue::Due(_))
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        match self {
            DeadlineValue::Due(d) => Some(*d),
            DeadlineValue::NotApplicable => None,
        }
    }

    /// Render into an output cell, using `sentinel` for not-applicable.
    pub fn to_cell(&self, sentinel: &str) -> CellValue {
        match self {
            DeadlineValue::Due(d) => CellValue::Date(*d),
            DeadlineValue::NotApplicable => CellValue::text(sentinel),
        }
    }
}

/// Aggregate document-submission status of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionStatus {
    #[serde(rename = "완료")]
    Complete,
    #[serde(rename = "진행중")]
    InProgress,
    #[serde(rename = "미진행중")]
    NotStarted,
}

impl SubmissionStatus {
    /// Derive the status from how many of `total` deadline fields apply.
    pub fn from_applicable(applicable: usize, total: usize) -> SubmissionStatus {
        if applicable == 0 {
            SubmissionStatus::NotStarted
        } else if applicable >= total {
            SubmissionStatus::Complete
        } else {
            SubmissionStatus::InProgress
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SubmissionStatus::Complete => "완료",
            SubmissionStatus::InProgress => "진행중",
            SubmissionStatus::NotStarted => "미진행중",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_display_without_fraction() {
        assert_eq!(CellValue::Number(1001.0).to_string(), "1001");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
    }

    #[test]
    fn push_row_pads_to_header_width() {
        let mut t = Table::new(vec!["a".into(), "b".into(), "c".into()]);
        t.push_row(vec![CellValue::text("x")]);
        assert_eq!(t.rows[0].len(), 3);
        assert_eq!(t.cell(0, 2), &CellValue::Empty);
    }

    #[test]
    fn require_column_reports_missing_name() {
        let t = Table::new(vec!["사번".into()]);
        match t.require_column("성명") {
            Err(LoanDocsError::MissingColumn { column }) => assert_eq!(column, "성명"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn status_is_total_over_applicability() {
        assert_eq!(
            SubmissionStatus::from_applicable(0, 4),
            SubmissionStatus::NotStarted
        );
        for n in 1..4 {
            assert_eq!(
                SubmissionStatus::from_applicable(n, 4),
                SubmissionStatus::InProgress
            );
        }
        assert_eq!(
            SubmissionStatus::from_applicable(4, 4),
            SubmissionStatus::Complete
        );
    }

    #[test]
    fn not_applicable_renders_sentinel() {
        assert_eq!(
            DeadlineValue::NotApplicable.to_cell("해당없음"),
            CellValue::text("해당없음")
        );
    }
}
