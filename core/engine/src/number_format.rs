//! FILENAME: core/engine/src/number_format.rs
//! PURPOSE: Number formatting utilities for displaying report values.
//! CONTEXT: This module handles the conversion of raw numeric values to
//! the compact display strings used by console reports ("$12k", "45.0%").

use chrono::NaiveDate;

/// Format a number with specified decimal places and optional thousands separator.
pub fn format_decimal(value: f64, decimal_places: u8, use_thousands_separator: bool) -> String {
    let rounded = format!("{:.prec$}", value, prec = decimal_places as usize);
    // "-0" is noise in a report cell
    let rounded = if rounded.starts_with('-') && rounded[1..].chars().all(|c| c == '0' || c == '.') {
        rounded[1..].to_string()
    } else {
        rounded
    };

    if use_thousands_separator {
        add_thousands_separator(&rounded)
    } else {
        rounded
    }
}

/// Add thousands separators to a numeric string.
pub fn add_thousands_separator(s: &str) -> String {
    let mut parts = s.splitn(2, '.');
    let integer_part = parts.next().unwrap_or("");
    let decimal_part = parts.next();

    let negative = integer_part.starts_with('-');
    let digits: String = integer_part.chars().filter(|c| c.is_ascii_digit()).collect();

    let mut result = String::new();
    let len = digits.len();

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    if negative {
        result = format!("-{}", result);
    }

    if let Some(decimal) = decimal_part {
        result.push('.');
        result.push_str(decimal);
    }

    result
}

/// Format an amount in thousands with a currency symbol: 12345 -> "$12k".
/// Negative amounts are shown in parentheses.
pub fn format_currency_thousands(value: f64, symbol: &str) -> String {
    let thousands = format_decimal((value / 1000.0).abs(), 0, true);
    let negative = value < 0.0 && thousands.chars().any(|c| c.is_ascii_digit() && c != '0');

    if negative {
        format!("({}{}k)", symbol, thousands)
    } else {
        format!("{}{}k", symbol, thousands)
    }
}

/// Format a ratio as percentage: 0.1234 -> "12.3%" with one decimal place.
pub fn format_percentage(value: f64, decimal_places: u8) -> String {
    let percentage = value * 100.0;
    format!("{}%", format_decimal(percentage, decimal_places, false))
}

/// Format a date with a strftime-style pattern ("%b" -> "Jan").
pub fn format_date(date: NaiveDate, pattern: &str) -> String {
    date.format(pattern).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(1234.567, 2, false), "1234.57");
        assert_eq!(format_decimal(1234.567, 2, true), "1,234.57");
        assert_eq!(format_decimal(1000000.0, 0, true), "1,000,000");
        assert_eq!(format_decimal(-0.2, 0, true), "0");
    }

    #[test]
    fn test_format_currency_thousands() {
        assert_eq!(format_currency_thousands(150_000.0, "$"), "$150k");
        assert_eq!(format_currency_thousands(1_234_567.0, "$"), "$1,235k");
        assert_eq!(format_currency_thousands(-25_000.0, "$"), "($25k)");
        assert_eq!(format_currency_thousands(-100.0, "$"), "$0k");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.5, 0), "50%");
        assert_eq!(format_percentage(0.1234, 1), "12.3%");
        assert_eq!(format_percentage(1.5, 1), "150.0%");
    }

    #[test]
    fn test_thousands_separator() {
        assert_eq!(add_thousands_separator("1234567"), "1,234,567");
        assert_eq!(add_thousands_separator("123"), "123");
        assert_eq!(add_thousands_separator("-1234.56"), "-1,234.56");
    }

    #[test]
    fn test_format_date() {
        let d = NaiveDate::from_ymd_opt(2018, 1, 15).unwrap();
        assert_eq!(format_date(d, "%b"), "Jan");
        assert_eq!(format_date(d, "%d %b"), "15 Jan");
    }
}
