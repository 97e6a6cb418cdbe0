use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Largest serial a spreadsheet can hold (9999-12-31).
pub const MAX_SERIAL: f64 = 2_958_465.0;

/// Convert a spreadsheet serial day number into a calendar date.
///
/// Uses the 1899-12-30 epoch, which is correct for every serial from
/// 1900-03-01 onwards. The fractional part (time of day) is dropped.
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial >= MAX_SERIAL + 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Convert a date-time into a spreadsheet serial number.
///
/// Returns `None` before 1900-03-01, where spreadsheet serials are ambiguous.
pub fn serial_from_datetime(dt: NaiveDateTime) -> Option<f64> {
    let first_safe = NaiveDate::from_ymd_opt(1900, 3, 1)?;
    if dt.date() < first_safe {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (dt - epoch).num_seconds() as f64;
    Some(seconds / 86_400.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn known_serials() {
        assert_eq!(date_from_serial(45292.0), Some(d(2024, 1, 1)));
        assert_eq!(date_from_serial(45595.0), Some(d(2024, 10, 30)));
    }

    #[test]
    fn time_of_day_is_dropped() {
        assert_eq!(date_from_serial(45595.75), Some(d(2024, 10, 30)));
    }

    #[test]
    fn serial_from_datetime_keeps_time_of_day() {
        let dt = d(2024, 10, 30).and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(serial_from_datetime(dt), Some(45595.5));
        assert_eq!(date_from_serial(45595.5), Some(dt.date()));
        assert_eq!(serial_from_datetime(d(1899, 12, 31).and_hms_opt(0, 0, 0).unwrap()), None);
    }

    #[test]
    fn out_of_range_serials_rejected() {
        assert_eq!(date_from_serial(0.0), None);
        assert_eq!(date_from_serial(-5.0), None);
        assert_eq!(date_from_serial(f64::NAN), None);
        assert_eq!(date_from_serial(20_241_130.0), None);
    }
}
