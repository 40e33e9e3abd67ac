//! FILENAME: core/engine/src/coord.rs
//! PURPOSE: Converts between A1-style addresses and 0-based grid coordinates.
//! CONTEXT: Report metadata (report name, report date) lives at fixed,
//! well-known cell addresses such as "B2". Column "A" = 0, "AA" = 26.
//! Row 1 in A1 notation = row 0 internally.

/// A cell coordinate as (row, col) with 0-based indices.
pub type CellCoord = (u32, u32);

/// Converts a column string (e.g., "A", "AA") to a 0-based column index.
/// Returns None for an empty string or non-alphabetic characters.
pub fn col_to_index(col_str: &str) -> Option<u32> {
    if col_str.is_empty() {
        return None;
    }
    let mut result: u32 = 0;
    for c in col_str.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        result = result.checked_mul(26)?.checked_add(digit)?;
    }
    Some(result - 1)
}

/// Converts a 0-based column index to a column string.
/// 0 -> "A", 25 -> "Z", 26 -> "AA".
pub fn index_to_col(mut col_index: u32) -> String {
    let mut result = String::new();
    loop {
        let remainder = col_index % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if col_index < 26 {
            break;
        }
        col_index = col_index / 26 - 1;
    }
    result
}

/// Parses an A1-style reference ("B2", "aa100") into a 0-based coordinate.
pub fn parse_a1(reference: &str) -> Option<CellCoord> {
    let reference = reference.trim();
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (col_part, row_part) = reference.split_at(split);
    let col = col_to_index(col_part)?;
    let row_num: u32 = row_part.parse().ok()?;
    if row_num == 0 {
        return None;
    }
    Some((row_num - 1, col))
}

/// Converts a 0-based (row, col) coordinate to an A1-style reference string.
pub fn coord_to_a1(coord: CellCoord) -> String {
    let (row, col) = coord;
    format!("{}{}", index_to_col(col), row + 1)
}
