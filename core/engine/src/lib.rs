//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Main library entry point for the shared worksheet primitives.
//! CONTEXT: Re-exports the cell, grid, coordinate and formatting types used
//! by the loader (`persistence`) and the report engine (`pivot-engine`).

pub mod cell;
pub mod coord;
pub mod date;
pub mod grid;
pub mod number_format;

// Re-export commonly used types at the crate root
pub use cell::{CellValue, OrderedFloat, ValueKey};
pub use coord::{col_to_index, coord_to_a1, index_to_col, parse_a1, CellCoord};
pub use date::{date_to_millis, excel_serial_to_date, millis_to_date, parse_date_text};
pub use grid::{Grid, GridLayout};
pub use number_format::{
    add_thousands_separator, format_currency_thousands, format_date, format_decimal,
    format_percentage,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_manages_grid() {
        let mut grid = Grid::new();
        let (row, col) = parse_a1("B3").unwrap();
        grid.set_cell(row, col, CellValue::text("Hello"));

        let retrieved = grid.get_cell(2, 1);
        assert_eq!(retrieved, Some(&CellValue::text("Hello")));
    }

    #[test]
    fn it_serializes_cell_values() {
        let value = CellValue::Number(42.0);
        let json = serde_json::to_string(&value).unwrap();
        let back: CellValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
