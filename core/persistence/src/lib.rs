//! FILENAME: core/persistence/src/lib.rs
//! Worksheet loading.
//!
//! Reads a sales export from an XLSX workbook into an `engine::Grid`, plus
//! the metadata a report needs: where the header and data rows are, and the
//! report name and date held in well-known cells.

mod error;
mod xlsx_reader;

pub use error::PersistenceError;
pub use xlsx_reader::load_worksheet;

use chrono::NaiveDate;
use engine::grid::{Grid, GridLayout};
use serde::{Deserialize, Serialize};

// ============================================================================
// SHEET SPEC
// ============================================================================

fn default_header_row() -> u32 {
    1
}

/// Where the data of a report lives inside a workbook.
/// Row numbers are 1-based as shown in spreadsheet software.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSpec {
    /// Sheet name, matched case-insensitively. `None` reads the first sheet.
    #[serde(default)]
    pub sheet: Option<String>,

    #[serde(default = "default_header_row")]
    pub header_row: u32,

    /// Defaults to the row after the header.
    #[serde(default)]
    pub first_data_row: Option<u32>,

    /// Inclusive. `None` reads to the last used row.
    #[serde(default)]
    pub last_data_row: Option<u32>,

    /// A1 address of the report name, e.g. "B1".
    #[serde(default)]
    pub report_name_cell: Option<String>,

    /// A1 address of the report date, e.g. "B2".
    #[serde(default)]
    pub report_date_cell: Option<String>,
}

impl Default for SheetSpec {
    fn default() -> Self {
        Self {
            sheet: None,
            header_row: default_header_row(),
            first_data_row: None,
            last_data_row: None,
            report_name_cell: None,
            report_date_cell: None,
        }
    }
}

impl SheetSpec {
    /// The 0-based grid layout described by this spec.
    pub fn layout(&self) -> GridLayout {
        let header_row = self.header_row.saturating_sub(1);
        GridLayout {
            header_row,
            first_data_row: self
                .first_data_row
                .map_or(header_row + 1, |row| row.saturating_sub(1)),
            last_data_row: self.last_data_row.map(|row| row.saturating_sub(1)),
        }
    }
}

// ============================================================================
// WORKSHEET
// ============================================================================

/// A loaded worksheet.
#[derive(Debug, Clone)]
pub struct Worksheet {
    /// Name of the sheet that was read.
    pub name: String,
    pub grid: Grid,
    pub layout: GridLayout,
    pub report_name: Option<String>,
    pub report_date: Option<NaiveDate>,
}
