//! FILENAME: core/pivot-engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PivotError {
    /// A row/column/stats spec names a column the table does not have.
    #[error("Invalid configuration: {axis} key '{key}' is not a column of this table")]
    InvalidConfiguration { axis: &'static str, key: String },

    /// Normalization met a column type it cannot transform.
    #[error("Unknown column type for '{key}'")]
    UnknownColumnType { key: String },

    #[error("Unparseable date '{value}' in column '{key}'")]
    UnparseableDate { key: String, value: String },

    /// Operations that need a built tree were called before `build()`.
    #[error("Aggregation tree has not been built")]
    NotBuilt,
}

pub type PivotResult<T> = Result<T, PivotError>;
