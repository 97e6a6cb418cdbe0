pub mod window;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::error::LoanDocsError;
use crate::model::{CellValue, Table, DATE_FORMAT};
use crate::parsing::serial::date_from_serial;
use crate::rules::schema::RuleSetDef;

pub use window::{ImminentOptions, Window, DEFAULT_WINDOW_MONTHS};

/// Header of the column naming the document that is due.
pub const DOCUMENT_HEADER: &str = "임박한 서류";
/// Header of the column holding the formatted deadline.
pub const DEADLINE_HEADER: &str = "제출기한";

/// A record whose deadline for one document falls inside the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImminentEntry {
    pub name: String,
    pub employee_id: String,
    pub title: String,
    /// Label of the deadline field that triggered selection.
    pub document: String,
    pub deadline: NaiveDate,
    pub status: String,
}

impl ImminentEntry {
    pub fn deadline_display(&self) -> String {
        self.deadline.format(DATE_FORMAT).to_string()
    }
}

/// Result of the imminent extraction. `Empty` is a successful run that
/// found nothing, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "entries", rename_all = "snake_case")]
pub enum ImminentOutcome {
    Entries(Vec<ImminentEntry>),
    Empty,
}

impl ImminentOutcome {
    pub fn entries(&self) -> &[ImminentEntry] {
        match self {
            ImminentOutcome::Entries(entries) => entries,
            ImminentOutcome::Empty => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ImminentOutcome::Empty)
    }

    /// Project the entries into the display table:
    /// name, employee id, title, document, deadline, status.
    pub fn to_table(&self, ruleset: &RuleSetDef) -> Table {
        let mut table = Table::new(vec![
            ruleset.columns.name.clone(),
            ruleset.columns.employee_id.clone(),
            ruleset.columns.title.clone(),
            DOCUMENT_HEADER.to_string(),
            DEADLINE_HEADER.to_string(),
            ruleset.status_field.clone(),
        ]);
        for e in self.entries() {
            table.push_row(vec![
                CellValue::text(&e.name),
                CellValue::text(&e.employee_id),
                CellValue::text(&e.title),
                CellValue::text(&e.document),
                CellValue::text(e.deadline_display()),
                CellValue::text(&e.status),
            ]);
        }
        table
    }
}

/// Select the records whose deadlines fall within the window.
///
/// Each deadline column is scanned in ruleset order, and rows are taken in
/// table order within a column. A record appears once per triggering
/// document; repeated (employee id, document) pairs keep the first hit.
pub fn extract_imminent(
    table: &Table,
    ruleset: &RuleSetDef,
    options: &ImminentOptions,
) -> Result<ImminentOutcome, LoanDocsError> {
    let name_col = table.require_column(&ruleset.columns.name)?;
    let id_col = table.require_column(&ruleset.columns.employee_id)?;
    let title_col = table.require_column(&ruleset.columns.title)?;
    let status_col = table.require_column(&ruleset.status_field)?;
    let deadline_cols = ruleset
        .rules
        .iter()
        .map(|rule| Ok((rule.label(), table.require_column(&rule.field)?)))
        .collect::<Result<Vec<_>, LoanDocsError>>()?;

    let window = options.window();
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for (label, col) in deadline_cols {
        let mut hits = 0usize;
        for row in 0..table.len() {
            let Some(deadline) = deadline_date(table.cell(row, col)) else {
                continue;
            };
            if !window.contains(deadline) {
                continue;
            }
            hits += 1;

            let employee_id = table.cell(row, id_col).to_string().trim().to_string();
            if !seen.insert((employee_id.clone(), label)) {
                continue;
            }

            entries.push(ImminentEntry {
                name: table.cell(row, name_col).to_string(),
                employee_id,
                title: table.cell(row, title_col).to_string(),
                document: label.to_string(),
                deadline,
                status: table.cell(row, status_col).to_string(),
            });
        }
        debug!(document = label, hits, "scanned deadline column");
    }

    info!(
        entries = entries.len(),
        from = %window.start,
        to = %window.end,
        "imminent extraction finished"
    );

    if entries.is_empty() {
        Ok(ImminentOutcome::Empty)
    } else {
        Ok(ImminentOutcome::Entries(entries))
    }
}

/// Deadline cells are read strictly: real dates, serials, or `YYYY-MM-DD`
/// text. The not-applicable marker and anything looser count as no date.
fn deadline_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Number(n) => date_from_serial(*n),
        CellValue::Text(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok(),
        CellValue::Empty | CellValue::Bool(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin::load_preset;

    const DEED_NEW: &str = "구매증빙서류(등기부등본_신규)";
    const RESIDENT_NEW: &str = "구매증빙서류(주민등록등본_신규)";
    const DEED_OLD: &str = "유주택자 증빙서류(등기부등본_기존)";
    const LEASE: &str = "전세증빙서류(주민등록등본)";

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn header() -> Vec<String> {
        ["성명", "사번", "직위", DEED_OLD, DEED_NEW, RESIDENT_NEW, LEASE, "서류제출완료여부"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn na() -> CellValue {
        CellValue::text("해당없음")
    }

    fn row(id: &str, deadlines: [CellValue; 4], status: &str) -> Vec<CellValue> {
        let mut cells = vec![
            CellValue::text(format!("직원{id}")),
            CellValue::text(id),
            CellValue::text("대리"),
        ];
        cells.extend(deadlines);
        cells.push(CellValue::text(status));
        cells
    }

    fn options() -> ImminentOptions {
        ImminentOptions::new(d(2024, 10, 30))
    }

    #[test]
    fn test_deadline_on_today_is_included() {
        let rs = load_preset("housing-loan").unwrap();
        let mut t = Table::new(header());
        t.push_row(row(
            "1001",
            [na(), CellValue::Date(d(2024, 10, 30)), na(), na()],
            "진행중",
        ));
        let outcome = extract_imminent(&t, &rs, &options()).unwrap();
        let entries = outcome.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].document, "구매 등기 증빙");
        assert_eq!(entries[0].deadline_display(), "2024-10-30");
        assert_eq!(entries[0].status, "진행중");
    }

    #[test]
    fn test_deadline_past_window_is_excluded() {
        let rs = load_preset("housing-loan").unwrap();
        let mut t = Table::new(header());
        t.push_row(row(
            "1001",
            [na(), CellValue::text("2025-01-01"), na(), na()],
            "진행중",
        ));
        t.push_row(row(
            "1002",
            [CellValue::text("2024-10-29"), na(), na(), na()],
            "진행중",
        ));
        let outcome = extract_imminent(&t, &rs, &options()).unwrap();
        assert_eq!(outcome, ImminentOutcome::Empty);
        assert!(outcome.is_empty());
    }

    #[test]
    fn test_duplicate_employee_and_field_collapse() {
        let rs = load_preset("housing-loan").unwrap();
        let mut t = Table::new(header());
        t.push_row(row(
            "1001",
            [na(), CellValue::text("2024-11-15"), na(), na()],
            "진행중",
        ));
        t.push_row(row(
            "1001",
            [na(), CellValue::text("2024-12-01"), na(), na()],
            "진행중",
        ));
        let outcome = extract_imminent(&t, &rs, &options()).unwrap();
        assert_eq!(outcome.entries().len(), 1);
        assert_eq!(outcome.entries()[0].deadline, d(2024, 11, 15));
    }

    #[test]
    fn test_one_record_can_trigger_several_fields() {
        let rs = load_preset("housing-loan").unwrap();
        let mut t = Table::new(header());
        let due = CellValue::Date(d(2024, 11, 20));
        t.push_row(row("1001", [na(), due.clone(), due, na()], "진행중"));
        t.push_row(row(
            "1002",
            [CellValue::Date(d(2024, 12, 1)), na(), na(), na()],
            "진행중",
        ));
        let outcome = extract_imminent(&t, &rs, &options()).unwrap();
        let docs: Vec<(&str, &str)> = outcome
            .entries()
            .iter()
            .map(|e| (e.employee_id.as_str(), e.document.as_str()))
            .collect();
        // Ruleset column order first, then table order
        assert_eq!(
            docs,
            vec![
                ("1002", "기존 소유 증빙"),
                ("1001", "구매 등기 증빙"),
                ("1001", "구매 주민등록 증빙"),
            ]
        );
    }

    #[test]
    fn test_loose_deadline_text_is_not_a_date() {
        let rs = load_preset("housing-loan").unwrap();
        let mut t = Table::new(header());
        t.push_row(row(
            "1001",
            [
                CellValue::text("2024/11/20"),
                CellValue::text("2024-11"),
                CellValue::text("2024년 11월"),
                CellValue::text("Nov-15"),
            ],
            "진행중",
        ));
        let outcome = extract_imminent(&t, &rs, &options()).unwrap();
        assert_eq!(outcome, ImminentOutcome::Empty);
    }

    #[test]
    fn test_deadline_cell_forms() {
        assert_eq!(deadline_date(&CellValue::text(" 2024-11-15 ")), Some(d(2024, 11, 15)));
        assert_eq!(deadline_date(&CellValue::Number(45595.0)), Some(d(2024, 10, 30)));
        assert_eq!(deadline_date(&na()), None);
        assert_eq!(deadline_date(&CellValue::text("2024-02-30")), None);
    }

    #[test]
    fn test_numeric_employee_ids_display_cleanly() {
        let rs = load_preset("housing-loan").unwrap();
        let mut t = Table::new(header());
        let mut r = row("x", [na(), na(), na(), CellValue::Number(45620.0)], "진행중");
        r[1] = CellValue::Number(1001.0);
        t.push_row(r);
        let outcome = extract_imminent(&t, &rs, &options()).unwrap();
        assert_eq!(outcome.entries()[0].employee_id, "1001");
        assert_eq!(outcome.entries()[0].document, "전세 증빙");
    }

    #[test]
    fn test_missing_deadline_column() {
        let rs = load_preset("housing-loan").unwrap();
        let t = Table::new(vec![
            "성명".into(),
            "사번".into(),
            "직위".into(),
            "서류제출완료여부".into(),
        ]);
        match extract_imminent(&t, &rs, &options()) {
            Err(LoanDocsError::MissingColumn { column }) => assert_eq!(column, DEED_OLD),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_display_table_shape() {
        let rs = load_preset("housing-loan").unwrap();
        let mut t = Table::new(header());
        t.push_row(row(
            "1001",
            [na(), CellValue::Date(d(2024, 11, 1)), na(), na()],
            "진행중",
        ));
        let table = extract_imminent(&t, &rs, &options())
            .unwrap()
            .to_table(&rs);
        assert_eq!(
            table.columns,
            vec!["성명", "사번", "직위", "임박한 서류", "제출기한", "서류제출완료여부"]
        );
        assert_eq!(table.cell(0, 4), &CellValue::text("2024-11-01"));
    }
}
