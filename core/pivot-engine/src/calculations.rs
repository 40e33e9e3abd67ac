//! FILENAME: core/pivot-engine/src/calculations.rs
//! Built-in custom-row calculations.
//!
//! Reports mostly need the same few derived rows: a ratio of two amounts,
//! a conditional count or sum, a trend indicator across the columns and a
//! traffic-light attainment row. Each is available as a constructor
//! returning a `Transform` and, for configuration files, as a
//! `CalculationSpec` variant.

use engine::CellValue;
use serde::Deserialize;

use crate::definition::{CustomSpec, ScalarValue, Thresholds, Transform};
use crate::format::Formatter;
use crate::styled::{Styled, Trend};
use crate::table::{Record, Table};
use crate::types::SemanticType;

// ============================================================================
// RECORD HELPERS
// ============================================================================

/// Numeric reading of a record value; booleans count as 0/1.
fn number(record: &Record, key: &str) -> f64 {
    match record.get(key) {
        Some(CellValue::Number(n)) => *n,
        Some(CellValue::Boolean(true)) => 1.0,
        _ => 0.0,
    }
}

/// Sum of `key` over `records`.
pub fn sum_of(records: &[&Record], key: &str) -> f64 {
    records.iter().fold(0.0, |acc, r| acc + number(r, key))
}

/// `numerator / denominator`, with a zero denominator read as 1.
fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        numerator
    } else {
        numerator / denominator
    }
}

fn value_matches(record: &Record, key: &str, expected: &CellValue) -> bool {
    record
        .get(key)
        .map_or(false, |value| value.key() == expected.key())
}

// ============================================================================
// CALCULATIONS
// ============================================================================

/// sum(numerator) / sum(denominator) per column.
pub fn ratio(numerator: impl Into<String>, denominator: impl Into<String>) -> Transform {
    let (numerator, denominator) = (numerator.into(), denominator.into());
    Transform::records(move |records| {
        CellValue::Number(safe_ratio(sum_of(records, &numerator), sum_of(records, &denominator)))
    })
}

/// Number of records whose `key` equals `value`.
pub fn count_where(key: impl Into<String>, value: impl Into<CellValue>) -> Transform {
    let (key, value) = (key.into(), value.into());
    Transform::records(move |records| {
        let count = records.iter().filter(|r| value_matches(r, &key, &value)).count();
        CellValue::Number(count as f64)
    })
}

/// Sum of `sum_key` over the records whose `where_key` equals `value`.
pub fn sum_where(
    sum_key: impl Into<String>,
    where_key: impl Into<String>,
    value: impl Into<CellValue>,
) -> Transform {
    let (sum_key, where_key, value) = (sum_key.into(), where_key.into(), value.into());
    Transform::records(move |records| {
        let sum = records
            .iter()
            .filter(|r| value_matches(r, &where_key, &value))
            .fold(0.0, |acc, r| acc + number(r, &sum_key));
        CellValue::Number(sum)
    })
}

/// ▲/▼/= per column, comparing the sum of `key` against the previous
/// column. The first column is flat; the total cell compares the last
/// column against the first.
pub fn trend(key: impl Into<String>) -> Transform {
    let key = key.into();
    Transform::row_series(move |columns, total| {
        let sums: Vec<f64> = columns.iter().map(|records| sum_of(records, &key)).collect();
        let mut cells: Vec<Styled> = sums
            .iter()
            .enumerate()
            .map(|(i, &sum)| {
                let previous = if i == 0 { sum } else { sums[i - 1] };
                Styled::trend(Trend::between(previous, sum))
            })
            .collect();
        if total.is_some() {
            let overall = match (sums.first(), sums.last()) {
                (Some(&first), Some(&last)) => Trend::between(first, last),
                _ => Trend::Flat,
            };
            cells.push(Styled::trend(overall));
        }
        cells
    })
}

/// sum(actual) / sum(target) per column as a percentage, colored by `thresholds`.
pub fn attainment(
    actual: impl Into<String>,
    target: impl Into<String>,
    thresholds: Thresholds,
    formatter: Formatter,
) -> Transform {
    let (actual, target) = (actual.into(), target.into());
    Transform::row_series(move |columns, total| {
        columns
            .iter()
            .map(Vec::as_slice)
            .chain(total)
            .map(|records| {
                let ratio = safe_ratio(sum_of(records, &actual), sum_of(records, &target));
                let text = formatter.value(SemanticType::Percent, &CellValue::Number(ratio));
                Styled::traffic(text, thresholds.light(ratio))
            })
            .collect()
    })
}

// ============================================================================
// CONFIGURATION
// ============================================================================

fn default_red_below() -> f64 {
    0.8
}

fn default_green_from() -> f64 {
    1.0
}

/// A built-in calculation as written in a report configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "calc", rename_all = "snake_case")]
pub enum Calculation {
    Ratio {
        numerator: String,
        denominator: String,
    },
    CountWhere {
        field: String,
        equals: ScalarValue,
    },
    SumWhere {
        sum: String,
        #[serde(rename = "where")]
        where_key: String,
        equals: ScalarValue,
    },
    Trend {
        of: String,
    },
    Attainment {
        actual: String,
        target: String,
        #[serde(default = "default_red_below", rename = "redBelow")]
        red_below: f64,
        #[serde(default = "default_green_from", rename = "greenFrom")]
        green_from: f64,
    },
}

impl Calculation {
    /// How scalar results are formatted unless the configuration says otherwise.
    pub fn default_kind(&self) -> SemanticType {
        match self {
            Calculation::Ratio { .. } | Calculation::Attainment { .. } => SemanticType::Percent,
            _ => SemanticType::Number,
        }
    }

    /// Match values are read the way `table` stores the matched column.
    pub fn transform(&self, table: &Table, formatter: &Formatter) -> Transform {
        let matched =
            |key: &str, equals: &ScalarValue| table.coerce(key, &CellValue::from(equals.clone()));
        match self {
            Calculation::Ratio { numerator, denominator } => {
                ratio(numerator.as_str(), denominator.as_str())
            }
            Calculation::CountWhere { field, equals } => {
                count_where(field.as_str(), matched(field, equals))
            }
            Calculation::SumWhere { sum, where_key, equals } => {
                sum_where(sum.as_str(), where_key.as_str(), matched(where_key, equals))
            }
            Calculation::Trend { of } => trend(of.as_str()),
            Calculation::Attainment {
                actual,
                target,
                red_below,
                green_from,
            } => attainment(
                actual.as_str(),
                target.as_str(),
                Thresholds {
                    red_below: *red_below,
                    green_from: *green_from,
                },
                formatter.clone(),
            ),
        }
    }
}

/// A configured custom row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CalculationSpec {
    /// Row label.
    pub key: String,

    #[serde(flatten)]
    pub calculation: Calculation,

    #[serde(default, rename = "type")]
    pub kind: Option<SemanticType>,

    #[serde(default, rename = "breakLineBefore")]
    pub break_line_before: bool,

    #[serde(default)]
    pub verbose: bool,
}

impl CalculationSpec {
    pub fn to_custom(&self, table: &Table, formatter: &Formatter) -> CustomSpec {
        CustomSpec {
            key: self.key.clone(),
            transform: self.calculation.transform(table, formatter),
            kind: self.kind.unwrap_or_else(|| self.calculation.default_kind()),
            break_line_before: self.break_line_before,
            verbose: self.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styled::{Emphasis, Traffic};
    use crate::table::TableOptions;

    /// Stage, Won (yes/no), Close (dates) and Amount.
    fn deals() -> Table {
        let row = |stage: &str, won: &str, close: &str, amount: f64| {
            vec![
                CellValue::text(stage),
                CellValue::text(won),
                CellValue::text(close),
                CellValue::Number(amount),
            ]
        };
        Table::from_rows(
            vec!["Stage", "Won", "Close", "Amount"],
            vec![
                row("Won", "Yes", "2018-01", 100.0),
                row("Lost", "No", "2018-02", 40.0),
                row("Won", "yes", "2018-02", 60.0),
            ],
            TableOptions::default(),
        )
        .unwrap()
    }

    fn configured(json: &str, table: &Table) -> CustomSpec {
        serde_json::from_str::<CalculationSpec>(json)
            .unwrap()
            .to_custom(table, &Formatter::default())
    }

    fn record(stage: &str, amount: f64, target: f64) -> Record {
        let mut record = Record::default();
        record.insert("Stage".to_string(), CellValue::text(stage));
        record.insert("Amount".to_string(), CellValue::Number(amount));
        record.insert("Target".to_string(), CellValue::Number(target));
        record
    }

    fn scalar(transform: &Transform, records: &[&Record]) -> CellValue {
        match transform {
            Transform::Records(f) => f(records),
            other => panic!("expected a scalar calculation, got {:?}", other),
        }
    }

    fn row(transform: &Transform, columns: &[Vec<&Record>], total: Option<&[&Record]>) -> Vec<Styled> {
        match transform {
            Transform::RowSeries(f) => f(columns, total),
            other => panic!("expected a row calculation, got {:?}", other),
        }
    }

    #[test]
    fn test_ratio_and_zero_denominator() {
        let a = record("Won", 50.0, 200.0);
        let b = record("Lost", 50.0, 0.0);
        assert_eq!(scalar(&ratio("Amount", "Target"), &[&a, &b]), CellValue::Number(0.5));
        assert_eq!(scalar(&ratio("Amount", "Target"), &[&b]), CellValue::Number(50.0));
        assert_eq!(scalar(&ratio("Amount", "Target"), &[]), CellValue::Number(0.0));
    }

    #[test]
    fn test_conditional_count_and_sum() {
        let a = record("Won", 50.0, 0.0);
        let b = record("Lost", 20.0, 0.0);
        let c = record("Won", 5.0, 0.0);
        let records = [&a, &b, &c];
        assert_eq!(scalar(&count_where("Stage", "Won"), &records), CellValue::Number(2.0));
        assert_eq!(scalar(&sum_where("Amount", "Stage", "Won"), &records), CellValue::Number(55.0));
    }

    #[test]
    fn test_trend_row() {
        let jan = record("Won", 10.0, 0.0);
        let feb = record("Won", 20.0, 0.0);
        let mar = record("Won", 5.0, 0.0);
        let columns = vec![vec![&jan], vec![&feb], vec![&mar]];
        let all = [&jan, &feb, &mar];
        let cells = row(&trend("Amount"), &columns, Some(&all));

        let symbols: Vec<&str> = cells.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(symbols, vec!["=", "▲", "▼", "▼"]);
        assert_eq!(cells[1].emphasis, Emphasis::Trend(Trend::Up));

        let without_total = row(&trend("Amount"), &columns, None);
        assert_eq!(without_total.len(), 3);
    }

    #[test]
    fn test_attainment_row() {
        let good = record("Won", 120.0, 100.0);
        let poor = record("Won", 50.0, 100.0);
        let columns = vec![vec![&good], vec![&poor]];
        let thresholds = Thresholds {
            red_below: 0.8,
            green_from: 1.0,
        };
        let cells = row(
            &attainment("Amount", "Target", thresholds, Formatter::default()),
            &columns,
            None,
        );
        assert_eq!(cells[0], Styled::traffic("120.0%", Traffic::Green));
        assert_eq!(cells[1], Styled::traffic("50.0%", Traffic::Red));
    }

    #[test]
    fn test_calculation_spec_from_json() {
        let table = deals();
        let spec: CalculationSpec = serde_json::from_str(
            r#"{ "key": "Win rate", "calc": "ratio", "numerator": "Won", "denominator": "Total",
                 "breakLineBefore": true }"#,
        )
        .unwrap();
        assert_eq!(
            spec.calculation,
            Calculation::Ratio {
                numerator: "Won".to_string(),
                denominator: "Total".to_string()
            }
        );
        let custom = spec.to_custom(&table, &Formatter::default());
        assert_eq!(custom.kind, SemanticType::Percent);
        assert!(custom.break_line_before);
        assert!(!custom.is_row_transformer());

        let spec: CalculationSpec =
            serde_json::from_str(r#"{ "key": "Trend", "calc": "trend", "of": "Amount" }"#).unwrap();
        assert_eq!(spec.calculation, Calculation::Trend { of: "Amount".to_string() });
        assert!(spec.to_custom(&table, &Formatter::default()).is_row_transformer());

        let spec: CalculationSpec = serde_json::from_str(
            r#"{ "key": "Won deals", "calc": "sum_where", "sum": "Amount", "where": "Stage",
                 "equals": "Won", "type": "currency" }"#,
        )
        .unwrap();
        assert_eq!(spec.to_custom(&table, &Formatter::default()).kind, SemanticType::Currency);
    }

    #[test]
    fn test_configured_match_values_follow_column_type() {
        let table = deals();
        let records: Vec<&Record> = table.records().iter().collect();
        assert_eq!(table.key_type("Won"), SemanticType::Boolean);
        assert_eq!(table.key_type("Close"), SemanticType::Date);

        let won = configured(
            r#"{ "key": "Won deals", "calc": "count_where", "field": "Won", "equals": "Yes" }"#,
            &table,
        );
        assert_eq!(scalar(&won.transform, &records), CellValue::Number(2.0));

        let won = configured(
            r#"{ "key": "Won deals", "calc": "count_where", "field": "Won", "equals": true }"#,
            &table,
        );
        assert_eq!(scalar(&won.transform, &records), CellValue::Number(2.0));

        let february = configured(
            r#"{ "key": "Feb", "calc": "sum_where", "sum": "Amount", "where": "Close", "equals": "2018-02" }"#,
            &table,
        );
        assert_eq!(scalar(&february.transform, &records), CellValue::Number(100.0));
    }
}
