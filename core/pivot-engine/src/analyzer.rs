//! FILENAME: core/pivot-engine/src/analyzer.rs
//! Statistics Analyzer - summary statistics for one series of values.
//!
//! Every series gets the three counts. Numeric series (number, currency,
//! percent, and booleans read as 0/1) add sum/avg/avgNonEmpty/min/max with
//! missing values read as 0. Date series add only min/max.
//!
//! A zero denominator is replaced by 1, so averages of empty groups are 0
//! and never NaN.

use engine::{date_to_millis, millis_to_date, CellValue, ValueKey};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::types::{MissingPolicy, SemanticType, StatKind};

/// Computed statistics of one series, keyed by kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    values: SmallVec<[(StatKind, CellValue); 8]>,
}

impl Stats {
    fn insert(&mut self, kind: StatKind, value: CellValue) {
        match self.values.iter_mut().find(|(k, _)| *k == kind) {
            Some(slot) => slot.1 = value,
            None => self.values.push((kind, value)),
        }
    }

    /// The statistic, or `None` when the series type does not have it.
    pub fn get(&self, kind: StatKind) -> Option<&CellValue> {
        self.values.iter().find(|(k, _)| *k == kind).map(|(_, v)| v)
    }

    /// The statistic as a number, when it is one.
    pub fn number(&self, kind: StatKind) -> Option<f64> {
        self.get(kind).and_then(CellValue::as_number)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Computes `Stats` for a series according to its semantic type.
/// One analyzer is created per report run and handed to the modeler.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    missing: MissingPolicy,
}

impl Analyzer {
    pub fn new(missing: MissingPolicy) -> Self {
        Analyzer { missing }
    }

    pub fn missing_policy(&self) -> &MissingPolicy {
        &self.missing
    }

    /// The statistic that best represents a column of this type.
    pub fn default_stat(kind: SemanticType) -> StatKind {
        match kind {
            SemanticType::Number
            | SemanticType::Currency
            | SemanticType::Percent
            | SemanticType::Boolean => StatKind::Sum,
            SemanticType::Date => StatKind::Max,
            SemanticType::String | SemanticType::Unknown => StatKind::Count,
        }
    }

    pub fn analyze<'a, I>(&self, kind: SemanticType, values: I) -> Stats
    where
        I: IntoIterator<Item = &'a CellValue>,
    {
        let values: Vec<&CellValue> = values.into_iter().collect();
        let mut stats = Stats::default();

        let mut distinct: FxHashSet<ValueKey> = FxHashSet::default();
        let mut non_empty = 0usize;
        for value in &values {
            if !self.missing.is_missing(value) {
                non_empty += 1;
                distinct.insert(value.key());
            }
        }
        stats.insert(StatKind::Count, CellValue::Number(values.len() as f64));
        stats.insert(StatKind::CountDistinct, CellValue::Number(distinct.len() as f64));
        stats.insert(StatKind::CountNonEmpty, CellValue::Number(non_empty as f64));

        match kind {
            SemanticType::Number | SemanticType::Currency | SemanticType::Percent => {
                let series: Vec<Option<f64>> = values.iter().map(|v| self.numeric(v)).collect();
                numeric_stats(&mut stats, &series);
            }
            SemanticType::Boolean => {
                let series: Vec<Option<f64>> = values.iter().map(|v| self.boolean(v)).collect();
                numeric_stats(&mut stats, &series);
            }
            SemanticType::Date => {
                let millis: Vec<f64> = values
                    .iter()
                    .filter_map(|v| v.as_date())
                    .map(date_to_millis)
                    .collect();
                let min = millis.iter().copied().reduce(f64::min);
                let max = millis.iter().copied().reduce(f64::max);
                if let Some(date) = min.and_then(millis_to_date) {
                    stats.insert(StatKind::Min, CellValue::Date(date));
                }
                if let Some(date) = max.and_then(millis_to_date) {
                    stats.insert(StatKind::Max, CellValue::Date(date));
                }
            }
            SemanticType::String | SemanticType::Unknown => {}
        }

        stats
    }

    /// `None` marks a missing value.
    fn numeric(&self, value: &CellValue) -> Option<f64> {
        if self.missing.is_missing(value) {
            return None;
        }
        match value {
            CellValue::Number(n) => Some(*n),
            CellValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Text(s) => s.trim().replace(',', "").parse().ok(),
            _ => None,
        }
    }

    fn boolean(&self, value: &CellValue) -> Option<f64> {
        if self.missing.is_missing(value) {
            return None;
        }
        match value {
            CellValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Number(n) => Some(if *n == 1.0 { 1.0 } else { 0.0 }),
            _ => Some(0.0),
        }
    }
}

fn denominator(count: usize) -> f64 {
    if count == 0 {
        1.0
    } else {
        count as f64
    }
}

fn numeric_stats(stats: &mut Stats, series: &[Option<f64>]) {
    let numbers: Vec<f64> = series.iter().map(|v| v.unwrap_or(0.0)).collect();
    // Sum for f64 starts at -0.0
    let sum = numbers.iter().fold(0.0, |acc, n| acc + n);
    let non_zero = series
        .iter()
        .filter(|v| matches!(v, Some(n) if *n != 0.0))
        .count();

    let min = numbers.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = numbers.iter().copied().reduce(f64::max).unwrap_or(0.0);

    stats.insert(StatKind::Sum, CellValue::Number(sum));
    stats.insert(StatKind::Avg, CellValue::Number(sum / denominator(numbers.len())));
    stats.insert(StatKind::AvgNonEmpty, CellValue::Number(sum / denominator(non_zero)));
    stats.insert(StatKind::Min, CellValue::Number(min));
    stats.insert(StatKind::Max, CellValue::Number(max));
}
