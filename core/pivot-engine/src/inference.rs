//! FILENAME: core/pivot-engine/src/inference.rs
//! Column type inference.
//!
//! Guesses the semantic type of a column from its sampled values. Checks run
//! in priority order and the first one that holds for every non-missing
//! value wins:
//! 1. number   - every value is a native number
//! 2. currency - every value is text with a "USD " prefix
//! 3. date     - every value is a date or date-like text
//! 4. boolean  - every value is a boolean, yes/no/true/false text, or 0/1
//! 5. string   - fallback
//!
//! Every check except the fallback needs at least one non-missing value, so
//! a column of nothing but sentinels is a string column.

use engine::{parse_date_text, CellValue};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{MissingPolicy, SemanticType};

/// Currency amounts in exports look like "USD 1,234.50".
pub(crate) static CURRENCY_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*usd\s+").expect("currency prefix pattern"));

/// Guesses the semantic type of a column.
pub fn guess_type<'a, I>(values: I, policy: &MissingPolicy) -> SemanticType
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let present: Vec<&CellValue> = values
        .into_iter()
        .filter(|v| !policy.is_missing(v))
        .collect();

    if present.is_empty() {
        return SemanticType::String;
    }

    if present.iter().all(|v| matches!(v, CellValue::Number(_))) {
        return SemanticType::Number;
    }
    if present.iter().all(|v| is_currency_text(v)) {
        return SemanticType::Currency;
    }
    if present.iter().all(|v| is_date_like(v)) {
        return SemanticType::Date;
    }
    if present.iter().all(|v| is_boolean_like(v)) {
        return SemanticType::Boolean;
    }
    SemanticType::String
}

fn is_currency_text(value: &CellValue) -> bool {
    match value {
        CellValue::Text(s) => CURRENCY_PREFIX.is_match(s),
        _ => false,
    }
}

fn is_date_like(value: &CellValue) -> bool {
    match value {
        CellValue::Date(_) => true,
        CellValue::Text(s) => parse_date_text(s).is_some(),
        _ => false,
    }
}

pub(crate) fn is_boolean_like(value: &CellValue) -> bool {
    match value {
        CellValue::Boolean(_) => true,
        CellValue::Number(n) => *n == 0.0 || *n == 1.0,
        CellValue::Text(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "yes" | "no" | "true" | "false"
        ),
        _ => false,
    }
}
