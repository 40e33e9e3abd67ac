//! FILENAME: core/pivot-engine/src/definition.rs
//! Report Definition - what to group by and what to compute.
//!
//! This module contains the types needed to DESCRIBE a report:
//! - `GroupingSpec`: one level of the row or column axis
//! - `StatsSpec`: one statistic line per row group
//! - `CustomSpec`: derived rows computed from a group's records at render time
//!
//! Grouping and stats specs deserialize from report configuration files.
//! Transforms are named built-ins there and arbitrary closures in code.

use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use engine::{parse_date_text, CellValue};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::analyzer::Analyzer;
use crate::styled::{Styled, Traffic};
use crate::table::Record;
use crate::types::{SemanticType, StatKind};

// ============================================================================
// TRANSFORMS
// ============================================================================

/// Maps one cell value to another (grouping buckets, label cleanup).
pub type ValueFn = Arc<dyn Fn(&CellValue) -> CellValue + Send + Sync>;

/// Reduces the records of one column to a single value.
pub type RecordsFn = Arc<dyn Fn(&[&Record]) -> CellValue + Send + Sync>;

/// Turns the records of every data column, and of the total column when the
/// report has one, into a row of cells (one per column, then the total).
pub type RowSeriesFn = Arc<dyn Fn(&[Vec<&Record>], Option<&[&Record]>) -> Vec<Styled> + Send + Sync>;

/// Transform attached to a spec, dispatched by variant.
#[derive(Clone, Default)]
pub enum Transform {
    #[default]
    Identity,
    /// Value-level mapping, used by grouping and stats specs.
    MapValue(ValueFn),
    /// Scalar custom calculation, called once per column.
    Records(RecordsFn),
    /// Row custom calculation, called once with all columns.
    RowSeries(RowSeriesFn),
}

impl Transform {
    pub fn map_value<F>(f: F) -> Self
    where
        F: Fn(&CellValue) -> CellValue + Send + Sync + 'static,
    {
        Transform::MapValue(Arc::new(f))
    }

    pub fn records<F>(f: F) -> Self
    where
        F: Fn(&[&Record]) -> CellValue + Send + Sync + 'static,
    {
        Transform::Records(Arc::new(f))
    }

    pub fn row_series<F>(f: F) -> Self
    where
        F: Fn(&[Vec<&Record>], Option<&[&Record]>) -> Vec<Styled> + Send + Sync + 'static,
    {
        Transform::RowSeries(Arc::new(f))
    }

    /// Named value transforms usable from configuration files.
    pub fn builtin(name: &str) -> Option<Self> {
        let transform = match name {
            "identity" => Transform::Identity,
            "month" => Transform::map_value(|v| match date_of(v) {
                Some(d) => NaiveDate::from_ymd_opt(d.year(), d.month(), 1)
                    .map(CellValue::Date)
                    .unwrap_or_else(|| v.clone()),
                None => v.clone(),
            }),
            "quarter" => Transform::map_value(|v| match date_of(v) {
                Some(d) => CellValue::Text(format!("{} Q{}", d.year(), (d.month() - 1) / 3 + 1)),
                None => v.clone(),
            }),
            "year" => Transform::map_value(|v| match date_of(v) {
                Some(d) => CellValue::Number(d.year() as f64),
                None => v.clone(),
            }),
            "upper" => Transform::map_value(|v| match v {
                CellValue::Text(s) => CellValue::Text(s.to_uppercase()),
                other => other.clone(),
            }),
            "trim" => Transform::map_value(|v| match v {
                CellValue::Text(s) => CellValue::Text(s.trim().to_string()),
                other => other.clone(),
            }),
            _ => return None,
        };
        Some(transform)
    }

    /// Applies a value transform. Record-level variants leave values unchanged.
    pub fn apply(&self, value: &CellValue) -> CellValue {
        match self {
            Transform::MapValue(f) => f(value),
            _ => value.clone(),
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Transform::Identity)
    }
}

fn date_of(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Date(d) => Some(*d),
        CellValue::Text(s) => parse_date_text(s),
        _ => None,
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Identity => f.write_str("Identity"),
            Transform::MapValue(_) => f.write_str("MapValue(..)"),
            Transform::Records(_) => f.write_str("Records(..)"),
            Transform::RowSeries(_) => f.write_str("RowSeries(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for Transform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Transform::builtin(&name)
            .ok_or_else(|| de::Error::custom(format!("unknown transform '{}'", name)))
    }
}

// ============================================================================
// CONFIGURATION VALUES
// ============================================================================

/// A plain JSON scalar as written in report configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl From<ScalarValue> for CellValue {
    fn from(value: ScalarValue) -> Self {
        match value {
            ScalarValue::Boolean(b) => CellValue::Boolean(b),
            ScalarValue::Number(n) => CellValue::Number(n),
            ScalarValue::Text(s) => CellValue::Text(s),
        }
    }
}

fn cell_values<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<CellValue>, D::Error> {
    let values = Vec::<ScalarValue>::deserialize(deserializer)?;
    Ok(values.into_iter().map(CellValue::from).collect())
}

/// Reads a configured value as the column's type would store it, so that
/// "2018-01" matches a date cell and "5" matches a number cell. Values that
/// do not convert are kept as written.
pub fn coerce_value(value: &CellValue, kind: SemanticType) -> CellValue {
    match (value, kind) {
        (CellValue::Text(s), SemanticType::Date) => {
            parse_date_text(s).map(CellValue::Date).unwrap_or_else(|| value.clone())
        }
        (CellValue::Text(s), k) if k.is_numeric() => s
            .trim()
            .parse::<f64>()
            .map(CellValue::Number)
            .unwrap_or_else(|_| value.clone()),
        _ => value.clone(),
    }
}

// ============================================================================
// GROUPING
// ============================================================================

/// A synthetic group whose records are the union of several values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Rollup {
    /// Label of the synthetic group ("APAC").
    pub key: String,

    /// Member values of the grouping column.
    #[serde(deserialize_with = "cell_values")]
    pub values: Vec<CellValue>,
}

impl Rollup {
    pub fn new<I, V>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        Rollup {
            key: key.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// One level of the row or column axis.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupingSpec {
    /// Column to group by.
    pub key: String,

    /// Applied to each record value before grouping.
    #[serde(default)]
    pub transform: Transform,

    /// Optional synthetic group appended after the natural values.
    #[serde(default)]
    pub rollup: Option<Rollup>,

    /// Values listed here come first, in this order.
    #[serde(default, rename = "sortBy", alias = "sortby", deserialize_with = "cell_values")]
    pub sort_by: Vec<CellValue>,
}

impl GroupingSpec {
    pub fn new(key: impl Into<String>) -> Self {
        GroupingSpec {
            key: key.into(),
            transform: Transform::Identity,
            rollup: None,
            sort_by: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_rollup(mut self, rollup: Rollup) -> Self {
        self.rollup = Some(rollup);
        self
    }

    pub fn with_sort_by<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.sort_by = values.into_iter().map(Into::into).collect();
        self
    }
}

// ============================================================================
// STATISTICS
// ============================================================================

/// Colors a numeric stat cell: below `red_below` is red, at or above
/// `green_from` is green, anything between is yellow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(rename = "redBelow")]
    pub red_below: f64,
    #[serde(rename = "greenFrom")]
    pub green_from: f64,
}

impl Thresholds {
    pub fn light(&self, value: f64) -> Traffic {
        if value < self.red_below {
            Traffic::Red
        } else if value >= self.green_from {
            Traffic::Green
        } else {
            Traffic::Yellow
        }
    }
}

/// One statistic line rendered for every row group.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsSpec {
    /// Column the statistic is computed over.
    pub key: String,

    /// Statistic to show. Defaults to the representative stat of the column type.
    #[serde(default)]
    pub stat: Option<StatKind>,

    /// Applied to each value before the analyzer sees it.
    #[serde(default)]
    pub transform: Transform,

    /// Treats the column as this type for analysis and formatting.
    #[serde(default, rename = "type")]
    pub kind: Option<SemanticType>,

    #[serde(default)]
    pub thresholds: Option<Thresholds>,
}

impl StatsSpec {
    pub fn new(key: impl Into<String>) -> Self {
        StatsSpec {
            key: key.into(),
            stat: None,
            transform: Transform::Identity,
            kind: None,
            thresholds: None,
        }
    }

    pub fn with_stat(mut self, stat: StatKind) -> Self {
        self.stat = Some(stat);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_kind(mut self, kind: SemanticType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_thresholds(mut self, red_below: f64, green_from: f64) -> Self {
        self.thresholds = Some(Thresholds { red_below, green_from });
        self
    }

    /// The statistic shown for a column of type `kind`.
    pub fn resolve(&self, kind: SemanticType) -> StatKind {
        self.stat.unwrap_or_else(|| Analyzer::default_stat(kind))
    }
}

// ============================================================================
// CUSTOM CALCULATIONS
// ============================================================================

/// A derived row rendered after every top-level row group.
#[derive(Debug, Clone)]
pub struct CustomSpec {
    /// Row label, translated through the dictionary.
    pub key: String,

    /// `Records` for one value per column, `RowSeries` for a whole row.
    pub transform: Transform,

    /// How scalar results are formatted.
    pub kind: SemanticType,

    /// Emits a blank line before the row.
    pub break_line_before: bool,

    /// Rendered only in verbose reports.
    pub verbose: bool,
}

impl CustomSpec {
    pub fn new(key: impl Into<String>, transform: Transform) -> Self {
        CustomSpec {
            key: key.into(),
            transform,
            kind: SemanticType::Number,
            break_line_before: false,
            verbose: false,
        }
    }

    pub fn with_kind(mut self, kind: SemanticType) -> Self {
        self.kind = kind;
        self
    }

    pub fn break_line_before(mut self) -> Self {
        self.break_line_before = true;
        self
    }

    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Row transformers receive every column at once.
    pub fn is_row_transformer(&self) -> bool {
        matches!(self.transform, Transform::RowSeries(_))
    }
}
