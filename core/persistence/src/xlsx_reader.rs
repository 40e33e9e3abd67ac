//! FILENAME: core/persistence/src/xlsx_reader.rs

use crate::{PersistenceError, SheetSpec, Worksheet};
use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::NaiveDate;
use engine::{excel_serial_to_date, parse_a1, parse_date_text, CellValue, Grid};
use std::path::Path;
use std::time::Instant;

/// Loads one worksheet of an XLSX export into a typed grid, along with the
/// report name and date held in the configured cells.
pub fn load_worksheet(path: &Path, spec: &SheetSpec) -> Result<Worksheet, PersistenceError> {
    let started = Instant::now();
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_names = workbook.sheet_names().to_vec();

    if sheet_names.is_empty() {
        return Err(PersistenceError::InvalidFormat(
            "Workbook contains no sheets".to_string(),
        ));
    }

    let sheet_name = match &spec.sheet {
        Some(name) => sheet_names
            .iter()
            .find(|candidate| candidate.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| PersistenceError::SheetNotFound(name.clone()))?,
        None => sheet_names[0].clone(),
    };

    let range = workbook.worksheet_range(&sheet_name)?;

    // range iterators are relative to the first used cell
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut grid = Grid::new();
    for (row_idx, col_idx, cell) in range.used_cells() {
        let value = match convert_value(cell) {
            Some(value) => value,
            None => continue,
        };
        grid.set_cell(start_row + row_idx as u32, start_col + col_idx as u32, value);
    }

    let report_name = match &spec.report_name_cell {
        Some(address) => {
            let name = cell_at(&grid, address)?.display_value().trim().to_string();
            if name.is_empty() {
                log::warn!("report name cell {} on '{}' is empty", address, sheet_name);
                None
            } else {
                Some(name)
            }
        }
        None => None,
    };

    let report_date = match &spec.report_date_cell {
        Some(address) => Some(read_date(&grid, address)?),
        None => None,
    };

    log::debug!(
        "loaded '{}' from {}: {} cells, {} rows in {:?}",
        sheet_name,
        path.display(),
        grid.cells.len(),
        grid.max_row + 1,
        started.elapsed()
    );

    Ok(Worksheet {
        name: sheet_name,
        layout: spec.layout(),
        grid,
        report_name,
        report_date,
    })
}

fn convert_value(cell: &Data) -> Option<CellValue> {
    let value = match cell {
        Data::Empty => return None,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::Error(e) => CellValue::Error(format!("{:?}", e)),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            // a bare time of day has no date part
            match excel_serial_to_date(serial) {
                Some(date) if serial.floor() > 0.0 => CellValue::Date(date),
                _ => CellValue::Number(serial),
            }
        }
        Data::DateTimeIso(s) => match parse_date_text(s) {
            Some(date) => CellValue::Date(date),
            None => CellValue::Text(s.clone()),
        },
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    };
    Some(value)
}

fn cell_at<'g>(grid: &'g Grid, address: &str) -> Result<&'g CellValue, PersistenceError> {
    let (row, col) = parse_a1(address)
        .ok_or_else(|| PersistenceError::InvalidFormat(format!("not a cell address: {}", address)))?;
    grid.get_cell(row, col)
        .ok_or_else(|| PersistenceError::MissingCell(address.to_string()))
}

fn read_date(grid: &Grid, address: &str) -> Result<NaiveDate, PersistenceError> {
    let value = cell_at(grid, address)?;
    let date = match value {
        CellValue::Date(date) => Some(*date),
        CellValue::Number(serial) => excel_serial_to_date(*serial),
        CellValue::Text(text) => parse_date_text(text),
        _ => None,
    };
    date.ok_or_else(|| PersistenceError::UnparseableDate {
        cell: address.to_string(),
        value: value.display_value(),
    })
}
