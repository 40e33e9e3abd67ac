//! FILENAME: core/engine/src/cell.rs
//! PURPOSE: Defines the typed value held by a single worksheet cell.
//! CONTEXT: Readers produce `CellValue`s, the pivot engine groups and
//! aggregates them. `ValueKey` is the hashable form of a value, used for
//! distinct counts and grouping lookups.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Represents the raw or normalized data within a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    Date(NaiveDate),
    Error(String),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the display value of the cell as a String.
    /// Used for labels and anything that needs the value as plain text.
    pub fn display_value(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => {
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::Error(e) => format!("#{}", e.to_uppercase()),
        }
    }

    /// Total ordering across variants: empty < number < date < text < boolean < error.
    pub fn total_cmp(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(b),
            (CellValue::Date(a), CellValue::Date(b)) => a.cmp(b),
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (CellValue::Boolean(a), CellValue::Boolean(b)) => a.cmp(b),
            (CellValue::Error(a), CellValue::Error(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            CellValue::Empty => 0,
            CellValue::Number(_) => 1,
            CellValue::Date(_) => 2,
            CellValue::Text(_) => 3,
            CellValue::Boolean(_) => 4,
            CellValue::Error(_) => 5,
        }
    }

    /// Hashable key for this value.
    pub fn key(&self) -> ValueKey {
        ValueKey::from(self)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

// ============================================================================
// HASHABLE KEYS
// ============================================================================

/// Wrapper around f64 that implements Eq and Hash for use as HashMap keys.
/// NaN values are treated as equal to each other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        if self.0.is_nan() && other.0.is_nan() {
            true
        } else {
            self.0 == other.0
        }
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        if self.0.is_nan() {
            u64::MAX.hash(state);
        } else if self.0 == 0.0 {
            // -0.0 and 0.0 compare equal, so they must hash equal too
            0u64.hash(state);
        } else {
            self.0.to_bits().hash(state);
        }
    }
}

/// A normalized, hashable representation of a cell value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    Empty,
    Number(OrderedFloat),
    Text(String),
    Boolean(bool),
    Date(NaiveDate),
    Error(String),
}

impl From<&CellValue> for ValueKey {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Empty => ValueKey::Empty,
            CellValue::Number(n) => ValueKey::Number(OrderedFloat(*n)),
            CellValue::Text(s) => ValueKey::Text(s.clone()),
            CellValue::Boolean(b) => ValueKey::Boolean(*b),
            CellValue::Date(d) => ValueKey::Date(*d),
            CellValue::Error(e) => ValueKey::Error(e.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_display_value() {
        assert_eq!(CellValue::Number(42.0).display_value(), "42");
        assert_eq!(CellValue::Number(2.5).display_value(), "2.5");
        assert_eq!(CellValue::Boolean(true).display_value(), "TRUE");
        let d = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        assert_eq!(CellValue::Date(d).display_value(), "2018-01-01");
    }

    #[test]
    fn test_total_cmp_orders_dates() {
        let jan = CellValue::Date(NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
        let feb = CellValue::Date(NaiveDate::from_ymd_opt(2018, 2, 1).unwrap());
        assert_eq!(jan.total_cmp(&feb), Ordering::Less);
        assert_eq!(CellValue::Empty.total_cmp(&jan), Ordering::Less);
    }

    #[test]
    fn test_value_keys_dedupe() {
        let mut keys = HashSet::new();
        keys.insert(CellValue::Number(0.0).key());
        keys.insert(CellValue::Number(-0.0).key());
        keys.insert(CellValue::text("ANZ").key());
        keys.insert(CellValue::text("ANZ").key());
        assert_eq!(keys.len(), 2);
    }
}
