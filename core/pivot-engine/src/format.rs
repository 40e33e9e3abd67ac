//! FILENAME: core/pivot-engine/src/format.rs
//! Type-aware display strings for header labels and data cells.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use engine::{format_currency_thousands, format_date, format_decimal, format_percentage, CellValue};
use serde::{Deserialize, Serialize};

use crate::dictionary::Dictionary;
use crate::modeler::{AxisValue, PathSegment, Tree};
use crate::types::{SemanticType, StatKind};

/// Label used for cells with no value (missing stat, broken path).
pub const NOT_AVAILABLE: &str = "N/A";

/// Label of groups whose value is empty.
pub const BLANK_LABEL: &str = "(blank)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Formatter {
    pub currency_symbol: String,
    pub percent_decimals: u8,
    /// Pattern for dates used as axis labels. Unset, each date axis gets the
    /// shortest pattern that keeps its values apart ("Jan", "Jan 2019",
    /// "05 Jan", "05 Jan 2019").
    pub header_date_pattern: Option<String>,
    /// Pattern for dates inside data cells ("05 Jan").
    pub cell_date_pattern: String,
    /// Fitted axis patterns per grouping key.
    #[serde(skip)]
    axis_date_patterns: BTreeMap<String, String>,
}

impl Default for Formatter {
    fn default() -> Self {
        Formatter {
            currency_symbol: "$".to_string(),
            percent_decimals: 1,
            header_date_pattern: None,
            cell_date_pattern: "%d %b".to_string(),
            axis_date_patterns: BTreeMap::new(),
        }
    }
}

impl Formatter {
    /// A copy whose date axes are labeled to fit the dates in `tree`.
    pub fn fit_dates(&self, tree: &Tree) -> Formatter {
        let mut dates: BTreeMap<&str, Vec<NaiveDate>> = BTreeMap::new();
        for segment in tree.nodes().iter().filter_map(|n| n.segment.as_ref()) {
            if let AxisValue::Value(CellValue::Date(date)) = &segment.value {
                dates.entry(segment.key.as_str()).or_default().push(*date);
            }
        }
        let mut fitted = self.clone();
        fitted.axis_date_patterns = dates
            .into_iter()
            .map(|(key, dates)| (key.to_string(), axis_date_pattern(&dates).to_string()))
            .collect();
        fitted
    }

    /// Display label of an axis segment, translated through the dictionary.
    pub fn label(&self, segment: &PathSegment, dictionary: &Dictionary) -> String {
        match &segment.value {
            AxisValue::Rollup(label) => dictionary.get(label).to_string(),
            AxisValue::Value(CellValue::Date(date)) => {
                let pattern = self
                    .header_date_pattern
                    .as_deref()
                    .or_else(|| self.axis_date_patterns.get(&segment.key).map(String::as_str))
                    .unwrap_or("%b");
                format_date(*date, pattern)
            }
            AxisValue::Value(CellValue::Empty) => BLANK_LABEL.to_string(),
            AxisValue::Value(CellValue::Text(s)) if s.is_empty() => BLANK_LABEL.to_string(),
            AxisValue::Value(other) => {
                let raw = other.display_value();
                dictionary.get(&raw).to_string()
            }
        }
    }

    /// Display string of a statistic of a column of type `kind`.
    /// `None` renders as "N/A".
    pub fn stat(&self, kind: SemanticType, stat: StatKind, value: Option<&CellValue>) -> String {
        match value {
            None => NOT_AVAILABLE.to_string(),
            Some(value) if stat.is_count() => self.value(SemanticType::Number, value),
            Some(value) => self.value(kind, value),
        }
    }

    /// Display string of a single value shown as type `kind`.
    pub fn value(&self, kind: SemanticType, value: &CellValue) -> String {
        match value {
            CellValue::Empty => NOT_AVAILABLE.to_string(),
            CellValue::Date(date) => format_date(*date, &self.cell_date_pattern),
            CellValue::Number(n) => match kind {
                SemanticType::Currency => format_currency_thousands(*n, &self.currency_symbol),
                SemanticType::Percent => format_percentage(*n, self.percent_decimals),
                _ => format_decimal(*n, 0, true),
            },
            CellValue::Boolean(b) => if *b { "1" } else { "0" }.to_string(),
            other => other.display_value(),
        }
    }
}

/// Months need no day; several years need the year.
fn axis_date_pattern(dates: &[NaiveDate]) -> &'static str {
    let month_starts = dates.iter().all(|d| d.day() == 1);
    let years = dates.iter().map(|d| d.year());
    let one_year = years.clone().min() == years.max();
    match (month_starts, one_year) {
        (true, true) => "%b",
        (true, false) => "%b %Y",
        (false, true) => "%d %b",
        (false, false) => "%d %b %Y",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::DictionaryEntry;
    use chrono::NaiveDate;

    #[test]
    fn test_stat_formats_by_type() {
        let f = Formatter::default();
        let amount = CellValue::Number(150_000.0);
        assert_eq!(f.stat(SemanticType::Currency, StatKind::Sum, Some(&amount)), "$150k");
        assert_eq!(
            f.stat(SemanticType::Percent, StatKind::Avg, Some(&CellValue::Number(0.456))),
            "45.6%"
        );
        assert_eq!(
            f.stat(SemanticType::Number, StatKind::Sum, Some(&CellValue::Number(1234.0))),
            "1,234"
        );
        assert_eq!(f.stat(SemanticType::Currency, StatKind::Sum, None), "N/A");
    }

    #[test]
    fn test_counts_ignore_column_type() {
        let f = Formatter::default();
        let count = CellValue::Number(3.0);
        assert_eq!(f.stat(SemanticType::Currency, StatKind::Count, Some(&count)), "3");
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_dates() {
        let f = Formatter::default();
        let date = ymd(2018, 1, 5);
        let segment = PathSegment::value("Close", CellValue::Date(date));
        assert_eq!(f.label(&segment, &Dictionary::new()), "Jan");
        assert_eq!(f.value(SemanticType::Date, &CellValue::Date(date)), "05 Jan");

        let fixed = Formatter {
            header_date_pattern: Some("%Y-%m".to_string()),
            ..Formatter::default()
        };
        assert_eq!(fixed.label(&segment, &Dictionary::new()), "2018-01");
    }

    #[test]
    fn test_axis_date_pattern_keeps_values_apart() {
        assert_eq!(axis_date_pattern(&[ymd(2018, 1, 1), ymd(2018, 2, 1)]), "%b");
        assert_eq!(axis_date_pattern(&[ymd(2018, 1, 1), ymd(2019, 1, 1)]), "%b %Y");
        assert_eq!(axis_date_pattern(&[ymd(2018, 1, 5), ymd(2018, 1, 20)]), "%d %b");
        assert_eq!(
            axis_date_pattern(&[ymd(2018, 1, 5), ymd(2018, 1, 20), ymd(2019, 1, 20)]),
            "%d %b %Y"
        );
    }

    #[test]
    fn test_labels_use_dictionary() {
        let f = Formatter::default();
        let mut dict = Dictionary::new();
        dict.set(DictionaryEntry::named("APAC", "Asia Pacific"));
        dict.set(DictionaryEntry::named("ANZ", "Aus/NZ"));
        assert_eq!(f.label(&PathSegment::rollup("Practice", "APAC"), &dict), "Asia Pacific");
        assert_eq!(f.label(&PathSegment::value("Practice", "ANZ"), &dict), "Aus/NZ");
        assert_eq!(f.label(&PathSegment::value("Year", 2018.0), &dict), "2018");
        assert_eq!(f.label(&PathSegment::value("Practice", CellValue::Empty), &dict), "(blank)");
    }
}
