//! FILENAME: core/pivot-engine/src/types.rs
//! Shared vocabulary of the report engine: semantic column types,
//! statistic kinds and the missing-value policy.

use std::fmt;
use std::str::FromStr;

use engine::CellValue;
use serde::{Deserialize, Serialize};

// ============================================================================
// SEMANTIC TYPES
// ============================================================================

/// What a column's values mean, as opposed to how the reader stored them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Number,
    Currency,
    Percent,
    Date,
    Boolean,
    String,
    /// Returned for keys the table does not know.
    Unknown,
}

impl SemanticType {
    /// Types aggregated through sum/avg/min/max.
    pub fn is_numeric(self) -> bool {
        matches!(self, SemanticType::Number | SemanticType::Currency | SemanticType::Percent)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SemanticType::Number => "number",
            SemanticType::Currency => "currency",
            SemanticType::Percent => "percent",
            SemanticType::Date => "date",
            SemanticType::Boolean => "boolean",
            SemanticType::String => "string",
            SemanticType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// STATISTICS
// ============================================================================

/// Statistics the analyzer can produce for a series of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatKind {
    #[serde(alias = "countTotal")]
    Count,
    CountDistinct,
    CountNonEmpty,
    Sum,
    Avg,
    AvgNonEmpty,
    Min,
    Max,
}

impl StatKind {
    pub const ALL: [StatKind; 8] = [
        StatKind::Count,
        StatKind::CountDistinct,
        StatKind::CountNonEmpty,
        StatKind::Sum,
        StatKind::Avg,
        StatKind::AvgNonEmpty,
        StatKind::Min,
        StatKind::Max,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StatKind::Count => "count",
            StatKind::CountDistinct => "countDistinct",
            StatKind::CountNonEmpty => "countNonEmpty",
            StatKind::Sum => "sum",
            StatKind::Avg => "avg",
            StatKind::AvgNonEmpty => "avgNonEmpty",
            StatKind::Min => "min",
            StatKind::Max => "max",
        }
    }

    /// Counts are plain numbers whatever the column type.
    pub fn is_count(self) -> bool {
        matches!(self, StatKind::Count | StatKind::CountDistinct | StatKind::CountNonEmpty)
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StatKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "count" | "countTotal" => Ok(StatKind::Count),
            _ => StatKind::ALL
                .iter()
                .copied()
                .find(|k| k.name() == s)
                .ok_or_else(|| format!("unknown statistic '{}'", s)),
        }
    }
}

// ============================================================================
// MISSING VALUES
// ============================================================================

/// Which cell values count as "no data".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingPolicy {
    /// Text sentinels (compared after trimming). Empty cells are always missing.
    pub sentinels: Vec<String>,
}

impl Default for MissingPolicy {
    fn default() -> Self {
        MissingPolicy {
            sentinels: vec![String::new(), "-".to_string()],
        }
    }
}

impl MissingPolicy {
    pub fn is_missing(&self, value: &CellValue) -> bool {
        match value {
            CellValue::Empty => true,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                self.sentinels.iter().any(|m| m == trimmed)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_kind_names_parse_back() {
        for kind in StatKind::ALL {
            assert_eq!(kind.name().parse::<StatKind>(), Ok(kind));
        }
        assert_eq!("countTotal".parse::<StatKind>(), Ok(StatKind::Count));
        assert!("median".parse::<StatKind>().is_err());
    }

    #[test]
    fn test_missing_policy_defaults() {
        let policy = MissingPolicy::default();
        assert!(policy.is_missing(&CellValue::Empty));
        assert!(policy.is_missing(&CellValue::text("")));
        assert!(policy.is_missing(&CellValue::text(" - ")));
        assert!(!policy.is_missing(&CellValue::text("ANZ")));
        assert!(!policy.is_missing(&CellValue::Number(0.0)));
    }

    #[test]
    fn test_unknown_type_displays_sentinel() {
        assert_eq!(SemanticType::Unknown.to_string(), "UNKNOWN");
        assert!(SemanticType::Currency.is_numeric());
        assert!(!SemanticType::Date.is_numeric());
    }
}
