use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::error::LoanDocsError;
use crate::model::CellValue;
use crate::parsing::serial::{date_from_serial, MAX_SERIAL};

static KOREAN_YEAR_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})\s*년\s*(\d{1,2})\s*월$").unwrap());
static YEAR_MONTH_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());
static YEAR_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})$").unwrap());
static MONTH_ABBREV_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]{3})-(\d{1,2})$").unwrap());

static LOOSE_YEAR_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})[./](\d{1,2})$").unwrap());
static COMPACT_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})(\d{2})(\d{2})$").unwrap());

const FALLBACK_DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y년 %m월 %d일",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d-%b-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const FALLBACK_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const MONTH_ABBREVS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Result of normalizing one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DateOutcome {
    Date(NaiveDate),
    Empty,
    Unparseable(String),
}

impl DateOutcome {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DateOutcome::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Strict accessor: anything other than a date is an `UnparseableDate` error.
    pub fn require(self) -> Result<NaiveDate, LoanDocsError> {
        match self {
            DateOutcome::Date(d) => Ok(d),
            DateOutcome::Empty => Err(LoanDocsError::UnparseableDate {
                value: String::new(),
            }),
            DateOutcome::Unparseable(value) => Err(LoanDocsError::UnparseableDate { value }),
        }
    }
}

/// Turns heterogeneous date cells into calendar dates.
///
/// The reference date is only consulted for formats that carry no year
/// (`Nov-30`): the occurrence closest to the reference wins, ties going to
/// the earlier year.
#[derive(Debug, Clone, Copy)]
pub struct DateNormalizer {
    reference: NaiveDate,
}

impl DateNormalizer {
    pub fn new(reference: NaiveDate) -> DateNormalizer {
        DateNormalizer { reference }
    }

    pub fn reference(&self) -> NaiveDate {
        self.reference
    }

    pub fn normalize(&self, cell: &CellValue) -> DateOutcome {
        match cell {
            CellValue::Empty => DateOutcome::Empty,
            CellValue::Date(d) => DateOutcome::Date(*d),
            CellValue::DateTime(dt) => DateOutcome::Date(dt.date()),
            CellValue::Number(n) => self.normalize_number(*n),
            CellValue::Text(s) => self.normalize_str(s),
            CellValue::Bool(_) => DateOutcome::Unparseable(cell.to_string()),
        }
    }

    pub fn normalize_str(&self, raw: &str) -> DateOutcome {
        let s = raw.trim();
        if s.is_empty() {
            return DateOutcome::Empty;
        }

        self.parse_known_pattern(s)
            .or_else(|| parse_generic(s))
            .map(DateOutcome::Date)
            .unwrap_or_else(|| DateOutcome::Unparseable(s.to_string()))
    }

    fn normalize_number(&self, n: f64) -> DateOutcome {
        if (1.0..MAX_SERIAL + 1.0).contains(&n) {
            if let Some(d) = date_from_serial(n) {
                return DateOutcome::Date(d);
            }
        }
        // 20241130 typed into a numeric cell
        if n.fract() == 0.0 && (10_000_101.0..=99_991_231.0).contains(&n) {
            return self.normalize_str(&format!("{}", n as i64));
        }
        DateOutcome::Unparseable(CellValue::Number(n).to_string())
    }

    /// The four recognized layouts, first match wins.
    fn parse_known_pattern(&self, s: &str) -> Option<NaiveDate> {
        if let Some(c) = KOREAN_YEAR_MONTH.captures(s) {
            return ymd(&c[1], &c[2], "1");
        }
        if let Some(c) = YEAR_MONTH_DAY.captures(s) {
            return ymd(&c[1], &c[2], &c[3]);
        }
        if let Some(c) = YEAR_MONTH.captures(s) {
            return ymd(&c[1], &c[2], "1");
        }
        if let Some(c) = MONTH_ABBREV_DAY.captures(s) {
            let month = month_from_abbrev(&c[1])?;
            let day: u32 = c[2].parse().ok()?;
            return self.nearest_occurrence(month, day);
        }
        None
    }

    fn nearest_occurrence(&self, month: u32, day: u32) -> Option<NaiveDate> {
        let year = self.reference.year();
        (year - 1..=year + 1)
            .filter_map(|y| NaiveDate::from_ymd_opt(y, month, day))
            .min_by_key(|d| ((*d - self.reference).num_days().abs(), *d))
    }
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn month_from_abbrev(s: &str) -> Option<u32> {
    let lower = s.to_lowercase();
    MONTH_ABBREVS
        .iter()
        .position(|m| *m == lower)
        .map(|i| i as u32 + 1)
}

/// Permissive fallback for layouts outside the known patterns.
fn parse_generic(s: &str) -> Option<NaiveDate> {
    if let Some(c) = COMPACT_DATE.captures(s) {
        return ymd(&c[1], &c[2], &c[3]);
    }

    // "2024. 11. 30." as written by Korean locale settings
    let dotted;
    let s = if s.contains('.') {
        dotted = s.trim_end_matches('.').replace(". ", ".");
        dotted.as_str()
    } else {
        s
    };

    if let Some(c) = LOOSE_YEAR_MONTH.captures(s) {
        return ymd(&c[1], &c[2], "1");
    }

    for fmt in FALLBACK_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    for fmt in FALLBACK_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn normalizer() -> DateNormalizer {
        DateNormalizer::new(d(2024, 10, 30))
    }

    fn parse(s: &str) -> Option<NaiveDate> {
        normalizer().normalize_str(s).date()
    }

    #[test]
    fn korean_year_month_defaults_to_first() {
        assert_eq!(parse("2024년 11월"), Some(d(2024, 11, 1)));
        assert_eq!(parse("2024년11월"), Some(d(2024, 11, 1)));
    }

    #[test]
    fn korean_full_date_goes_through_fallback() {
        assert_eq!(parse("2024년 11월 30일"), Some(d(2024, 11, 30)));
    }

    #[test]
    fn iso_date_and_year_month() {
        assert_eq!(parse("2024-11-30"), Some(d(2024, 11, 30)));
        assert_eq!(parse("2024-8-1"), Some(d(2024, 8, 1)));
        assert_eq!(parse("2024-11"), Some(d(2024, 11, 1)));
    }

    #[test]
    fn month_abbrev_picks_nearest_year() {
        assert_eq!(parse("Dec-01"), Some(d(2024, 12, 1)));
        assert_eq!(parse("Jan-15"), Some(d(2025, 1, 15)));
        assert_eq!(parse("Jun-01"), Some(d(2024, 6, 1)));
        assert_eq!(parse("nov-30"), Some(d(2024, 11, 30)));
    }

    #[test]
    fn month_abbrev_leap_day_skips_invalid_years() {
        // 2024 is the only leap year among 2023..=2025
        assert_eq!(parse("Feb-29"), Some(d(2024, 2, 29)));
    }

    #[test]
    fn fallback_formats() {
        assert_eq!(parse("2024/11/30"), Some(d(2024, 11, 30)));
        assert_eq!(parse("2024.11.30"), Some(d(2024, 11, 30)));
        assert_eq!(parse("2024. 11. 30."), Some(d(2024, 11, 30)));
        assert_eq!(parse("20241130"), Some(d(2024, 11, 30)));
        assert_eq!(parse("2024.11"), Some(d(2024, 11, 1)));
        assert_eq!(parse("2024-11-30 00:00:00"), Some(d(2024, 11, 30)));
        assert_eq!(parse("2024-11-30T09:15:00"), Some(d(2024, 11, 30)));
        assert_eq!(parse("11/30/2024"), Some(d(2024, 11, 30)));
        assert_eq!(parse("30 Nov 2024"), Some(d(2024, 11, 30)));
    }

    #[test]
    fn impossible_dates_are_unparseable() {
        assert_eq!(
            normalizer().normalize_str("2024-02-30"),
            DateOutcome::Unparseable("2024-02-30".into())
        );
        assert_eq!(
            normalizer().normalize_str("2024년 13월"),
            DateOutcome::Unparseable("2024년 13월".into())
        );
    }

    #[test]
    fn garbage_is_unparseable() {
        assert_eq!(
            normalizer().normalize_str(" 미정 "),
            DateOutcome::Unparseable("미정".into())
        );
    }

    #[test]
    fn empty_passes_through() {
        assert_eq!(normalizer().normalize(&CellValue::Empty), DateOutcome::Empty);
        assert_eq!(normalizer().normalize_str("   "), DateOutcome::Empty);
    }

    #[test]
    fn typed_cells() {
        let n = normalizer();
        assert_eq!(
            n.normalize(&CellValue::Date(d(2024, 8, 1))).date(),
            Some(d(2024, 8, 1))
        );
        assert_eq!(
            n.normalize(&CellValue::Number(45595.0)).date(),
            Some(d(2024, 10, 30))
        );
        assert_eq!(
            n.normalize(&CellValue::Number(20241130.0)).date(),
            Some(d(2024, 11, 30))
        );
        assert!(matches!(
            n.normalize(&CellValue::Bool(true)),
            DateOutcome::Unparseable(_)
        ));
    }

    #[test]
    fn formatted_date_round_trips() {
        let n = normalizer();
        for date in [d(2024, 1, 1), d(2024, 2, 29), d(1999, 12, 31), d(2030, 7, 4)] {
            let text = date.format(crate::model::DATE_FORMAT).to_string();
            assert_eq!(n.normalize_str(&text).date(), Some(date));
        }
    }

    #[test]
    fn require_maps_to_error() {
        assert!(matches!(
            normalizer().normalize_str("abc").require(),
            Err(LoanDocsError::UnparseableDate { value }) if value == "abc"
        ));
    }
}
