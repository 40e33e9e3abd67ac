//! FILENAME: core/pivot-engine/src/table.rs
//! Table - typed records built from a raw grid.
//!
//! Construction runs in three steps:
//! 1. Infer a semantic type per column and record it in the dictionary.
//! 2. Build one record per data row (header -> raw cell).
//! 3. Normalize every value according to its column type.
//!
//! After construction a table is read-only.

use engine::{excel_serial_to_date, parse_date_text, CellValue, Grid, GridLayout, ValueKey};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::definition::{coerce_value, Transform};
use crate::dictionary::{Dictionary, DictionaryEntry};
use crate::error::{PivotError, PivotResult};
use crate::inference::{guess_type, CURRENCY_PREFIX};
use crate::lookup::Lookup;
use crate::types::{MissingPolicy, SemanticType};

/// Index of a record within its table.
pub type RecordId = usize;

/// One data row: column key -> normalized value.
pub type Record = FxHashMap<String, CellValue>;

/// Options controlling table construction.
#[derive(Debug, Clone)]
pub struct TableOptions {
    /// Number of leading data rows sampled for type inference. `None` samples all.
    pub sample_size: Option<usize>,

    pub missing: MissingPolicy,

    /// Canonical labels for string columns.
    pub lookup: Lookup,

    /// Column types that replace the inferred ones.
    pub types: FxHashMap<String, SemanticType>,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            sample_size: None,
            missing: MissingPolicy::default(),
            lookup: Lookup::builtin(),
            types: FxHashMap::default(),
        }
    }
}

/// Typed records sharing one key set.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    records: Vec<Record>,
    dictionary: Dictionary,
    missing: MissingPolicy,
    lookup: Lookup,
}

impl Table {
    /// Builds a table from the header and data rows of `grid`.
    /// Columns with a blank header are not part of the table.
    pub fn from_grid(grid: &Grid, layout: &GridLayout, options: TableOptions) -> PivotResult<Self> {
        let header_cells = grid.row_values(layout.header_row);
        let rows: Vec<Vec<CellValue>> = layout
            .data_rows(grid)
            .map(|row| grid.row_values(row))
            .collect();
        Self::from_rows(header_cells, rows, options)
    }

    /// Builds a table from header cells and dense data rows.
    pub fn from_rows<H>(headers: H, rows: Vec<Vec<CellValue>>, options: TableOptions) -> PivotResult<Self>
    where
        H: IntoIterator,
        H::Item: Into<CellValue>,
    {
        let mut columns: Vec<(usize, String)> = Vec::new();
        let mut seen = FxHashSet::default();
        for (index, cell) in headers.into_iter().enumerate() {
            let name = cell.into().display_value().trim().to_string();
            if name.is_empty() {
                continue;
            }
            if !seen.insert(name.clone()) {
                log::warn!("duplicate column '{}' at index {} ignored", name, index);
                continue;
            }
            columns.push((index, name));
        }

        // Step 1: dictionary of inferred types
        let sample = options.sample_size.unwrap_or(rows.len()).min(rows.len());
        let mut dictionary = Dictionary::new();
        for (index, name) in &columns {
            let kind = match options.types.get(name) {
                Some(kind) => *kind,
                None => guess_type(
                    rows[..sample].iter().filter_map(|row| row.get(*index)),
                    &options.missing,
                ),
            };
            dictionary.set(DictionaryEntry::typed(name.clone(), kind));
        }

        // Step 2: raw records
        let mut records: Vec<Record> = rows
            .into_iter()
            .map(|row| {
                let mut record = Record::default();
                for (index, name) in &columns {
                    let value = row.get(*index).cloned().unwrap_or_default();
                    record.insert(name.clone(), value);
                }
                record
            })
            .collect();

        // Step 3: normalization
        for (_, name) in &columns {
            let kind = dictionary.kind(name).unwrap_or(SemanticType::Unknown);
            for record in records.iter_mut() {
                if let Some(value) = record.get_mut(name) {
                    let normalized = normalize(name, kind, value, &options.missing, &options.lookup)?;
                    *value = normalized;
                }
            }
        }

        log::debug!(
            "table built: {} columns, {} records ({} sampled for inference)",
            columns.len(),
            records.len(),
            sample
        );

        Ok(Table {
            headers: columns.into_iter().map(|(_, name)| name).collect(),
            records,
            dictionary,
            missing: options.missing,
            lookup: options.lookup,
        })
    }

    /// Column keys in sheet order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column types and names known to this table.
    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.dictionary.exist(key)
    }

    pub fn has_keys<'a, I>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        keys.into_iter().all(|key| self.has_key(key))
    }

    /// Type of a column; `Unknown` for keys the table does not have.
    pub fn key_type(&self, key: &str) -> SemanticType {
        self.dictionary.kind(key).unwrap_or(SemanticType::Unknown)
    }

    /// Reads a configured value (rollup member, sort key, match value) the way
    /// the column's data was normalized. Values that do not convert are kept
    /// as written.
    pub fn coerce(&self, key: &str, value: &CellValue) -> CellValue {
        let kind = self.key_type(key);
        let value = coerce_value(value, kind);
        if kind == SemanticType::Unknown {
            return value;
        }
        normalize(key, kind, &value, &self.missing, &self.lookup).unwrap_or(value)
    }

    /// Every value of a column, in record order. Empty for unknown keys.
    pub fn key_values(&self, key: &str) -> Vec<&CellValue> {
        self.records.iter().filter_map(|r| r.get(key)).collect()
    }

    /// Distinct transformed values of a column.
    /// Date columns come back sorted ascending, others in encounter order.
    pub fn key_distinct_values(&self, key: &str, transform: &Transform) -> Vec<CellValue> {
        let mut seen: FxHashSet<ValueKey> = FxHashSet::default();
        let mut values = Vec::new();
        for value in self.key_values(key) {
            let value = transform.apply(value);
            if seen.insert(value.key()) {
                values.push(value);
            }
        }
        if self.key_type(key) == SemanticType::Date {
            values.sort_by(|a, b| a.total_cmp(b));
        }
        values
    }
}

// ============================================================================
// NORMALIZATION
// ============================================================================

fn normalize(
    key: &str,
    kind: SemanticType,
    value: &CellValue,
    policy: &MissingPolicy,
    lookup: &Lookup,
) -> PivotResult<CellValue> {
    let missing = policy.is_missing(value);
    let normalized = match kind {
        SemanticType::Number | SemanticType::Percent => {
            if missing {
                CellValue::Empty
            } else {
                value.clone()
            }
        }
        SemanticType::Date => {
            if missing {
                return Ok(CellValue::Empty);
            }
            match value {
                CellValue::Date(_) => value.clone(),
                CellValue::Text(s) => match parse_date_text(s) {
                    Some(date) => CellValue::Date(date),
                    None => return Err(unparseable_date(key, value)),
                },
                CellValue::Number(n) => match excel_serial_to_date(*n) {
                    Some(date) => CellValue::Date(date),
                    None => return Err(unparseable_date(key, value)),
                },
                _ => return Err(unparseable_date(key, value)),
            }
        }
        SemanticType::String => match value {
            CellValue::Text(s) => {
                let trimmed = s.trim();
                CellValue::Text(lookup.canonical(trimmed).to_string())
            }
            other => other.clone(),
        },
        SemanticType::Currency => {
            if missing {
                return Ok(CellValue::Number(0.0));
            }
            match value {
                CellValue::Number(n) => CellValue::Number(*n),
                CellValue::Text(s) => CellValue::Number(parse_amount(key, s)),
                other => {
                    log::warn!("column '{}': non-amount value {:?} read as 0", key, other);
                    CellValue::Number(0.0)
                }
            }
        }
        SemanticType::Boolean => CellValue::Boolean(match value {
            CellValue::Boolean(b) => *b,
            CellValue::Number(n) => *n == 1.0,
            CellValue::Text(s) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "yes" | "true" | "1"
            ),
            _ => false,
        }),
        SemanticType::Unknown => {
            return Err(PivotError::UnknownColumnType {
                key: key.to_string(),
            })
        }
    };
    Ok(normalized)
}

fn unparseable_date(key: &str, value: &CellValue) -> PivotError {
    PivotError::UnparseableDate {
        key: key.to_string(),
        value: value.display_value(),
    }
}

/// "USD 1,234.50" -> 1234.5. Unreadable amounts are logged and read as 0.
fn parse_amount(key: &str, text: &str) -> f64 {
    let stripped = CURRENCY_PREFIX.replace(text, "");
    let digits: String = stripped.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    match digits.parse::<f64>() {
        Ok(amount) => amount,
        Err(_) => {
            log::warn!("column '{}': unreadable amount '{}' read as 0", key, text);
            0.0
        }
    }
}
