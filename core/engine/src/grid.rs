//! FILENAME: core/engine/src/grid.rs
//! PURPOSE: Holds the cells of one worksheet as loaded from a spreadsheet export.
//! CONTEXT: This file defines the `Grid` struct which acts as the container
//! for raw cell data. It uses a sparse strategy (HashMap) so exports with
//! wide, mostly empty ranges stay cheap.

use std::collections::HashMap;

use crate::cell::CellValue;
use crate::coord::CellCoord;

static EMPTY_VALUE: CellValue = CellValue::Empty;

/// The Grid struct holds the typed values of a worksheet.
/// Row and Col are 0-based indices.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    /// Sparse storage: keys are (row, col), values are cell values.
    pub cells: HashMap<CellCoord, CellValue>,

    /// Tracks the highest row index currently in use.
    pub max_row: u32,

    /// Tracks the highest column index currently in use.
    pub max_col: u32,
}

impl Grid {
    /// Creates a new, empty Grid.
    pub fn new() -> Self {
        Grid {
            cells: HashMap::new(),
            max_row: 0,
            max_col: 0,
        }
    }

    /// Builds a grid from dense rows, starting at (0, 0).
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        let mut grid = Grid::new();
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                grid.set_cell(r as u32, c as u32, value);
            }
        }
        grid
    }

    /// Sets a cell at the specified coordinates.
    /// Empty values are not stored; bounds grow automatically.
    pub fn set_cell(&mut self, row: u32, col: u32, value: CellValue) {
        if value.is_empty() {
            self.cells.remove(&(row, col));
            return;
        }
        if row > self.max_row {
            self.max_row = row;
        }
        if col > self.max_col {
            self.max_col = col;
        }
        self.cells.insert((row, col), value);
    }

    /// Retrieves a reference to a cell at the specified coordinates.
    /// Returns None if the cell is empty (not stored).
    pub fn get_cell(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    /// Like `get_cell`, but yields `CellValue::Empty` for unset cells.
    pub fn value(&self, row: u32, col: u32) -> &CellValue {
        self.cells.get(&(row, col)).unwrap_or(&EMPTY_VALUE)
    }

    /// Returns the values of one row from column 0 through `max_col`.
    pub fn row_values(&self, row: u32) -> Vec<CellValue> {
        (0..=self.max_col)
            .map(|col| self.value(row, col).clone())
            .collect()
    }

    /// True if no stored cell exists in the row.
    pub fn is_row_empty(&self, row: u32) -> bool {
        (0..=self.max_col).all(|col| self.get_cell(row, col).is_none())
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Where the header and the data rows of a table sit inside a grid.
/// All rows are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub header_row: u32,
    pub first_data_row: u32,
    /// Last data row, inclusive. `None` reads to the end of the grid.
    pub last_data_row: Option<u32>,
}

impl Default for GridLayout {
    fn default() -> Self {
        GridLayout::new(0)
    }
}

impl GridLayout {
    /// Header at `header_row`, data directly below it to the end of the grid.
    pub fn new(header_row: u32) -> Self {
        GridLayout {
            header_row,
            first_data_row: header_row + 1,
            last_data_row: None,
        }
    }

    /// Data rows of `grid` in order, skipping rows with no stored cell.
    pub fn data_rows<'g>(&self, grid: &'g Grid) -> impl Iterator<Item = u32> + 'g {
        let last = self
            .last_data_row
            .map_or(grid.max_row, |last| last.min(grid.max_row));
        (self.first_data_row..=last).filter(move |&row| !grid.is_row_empty(row))
    }
}
