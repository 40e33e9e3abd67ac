//! FILENAME: core/engine/src/date.rs
//! PURPOSE: Calendar date parsing shared by readers and type inference.
//! CONTEXT: Spreadsheet exports carry dates either as Excel serial numbers
//! or as text in a handful of common layouts, including bare "YYYY-MM"
//! month keys which are read as the first day of that month.

use chrono::{Duration, NaiveDate};

/// Text layouts accepted as calendar dates, tried in order.
const DATE_PATTERNS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
];

/// Parses a text cell as a calendar date. Returns None if no layout matches.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    // ISO timestamps ("2018-01-05T00:00:00") keep only the date part
    let text = match text.find('T') {
        Some(pos) if pos == 10 => &text[..pos],
        _ => text,
    };

    for pattern in DATE_PATTERNS {
        if let Ok(date) = NaiveDate::parse_from_str(text, pattern) {
            return Some(date);
        }
    }

    // Month keys: "2018-01"
    if text.len() == 7 && text.as_bytes()[4] == b'-' {
        return NaiveDate::parse_from_str(&format!("{}-01", text), "%Y-%m-%d").ok();
    }

    None
}

/// Converts an Excel serial day number to a date.
/// Serial 1 is 1900-01-01; the 1900 leap-year quirk is absorbed by the
/// 1899-12-30 epoch for every serial after February 1900.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Milliseconds since the Unix epoch at midnight of `date`.
pub fn date_to_millis(date: NaiveDate) -> f64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis() as f64)
        .unwrap_or(0.0)
}

/// Inverse of `date_to_millis`, truncating any time of day.
pub fn millis_to_date(millis: f64) -> Option<NaiveDate> {
    if !millis.is_finite() {
        return None;
    }
    chrono::DateTime::from_timestamp_millis(millis as i64).map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_text_layouts() {
        assert_eq!(parse_date_text("2018-01-15"), Some(ymd(2018, 1, 15)));
        assert_eq!(parse_date_text("01/15/2018"), Some(ymd(2018, 1, 15)));
        assert_eq!(parse_date_text("15-Jan-2018"), Some(ymd(2018, 1, 15)));
        assert_eq!(parse_date_text("2018-01-15T00:00:00"), Some(ymd(2018, 1, 15)));
        assert_eq!(parse_date_text("2018-01"), Some(ymd(2018, 1, 1)));
    }

    #[test]
    fn test_parse_date_text_rejects() {
        assert_eq!(parse_date_text(""), None);
        assert_eq!(parse_date_text("ANZ"), None);
        assert_eq!(parse_date_text("2018-13"), None);
        assert_eq!(parse_date_text("USD 100"), None);
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(excel_serial_to_date(43101.0), Some(ymd(2018, 1, 1)));
        assert_eq!(excel_serial_to_date(43101.75), Some(ymd(2018, 1, 1)));
        assert_eq!(excel_serial_to_date(0.0), None);
    }

    #[test]
    fn test_millis_roundtrip() {
        let d = ymd(2018, 3, 31);
        assert_eq!(millis_to_date(date_to_millis(d)), Some(d));
    }
}
