// Workbook import (xlsx, xlsm, xls, xlsb, ods) via calamine.
//
// Only the first sheet is read. Cells are rendered to the strings a user
// would type, so the grid lines up with CSV input.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use tracing::debug;

use crate::error::IoError;
use crate::sheet::Grid;

pub fn read_first_sheet(path: &Path) -> Result<Grid, IoError> {
    std::fs::metadata(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut workbook: Sheets<_> =
        open_workbook_auto(path).map_err(|e| IoError::Spreadsheet(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(IoError::NoSheets)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IoError::Spreadsheet(format!("sheet '{}': {}", sheet_name, e)))?;

    let (height, width) = range.get_size();
    if height == 0 || width == 0 {
        debug!(sheet = %sheet_name, "first sheet is empty");
        return Ok(Grid::new());
    }

    // Range start offset (data may not begin at A1). Pad so that grid
    // positions match sheet positions.
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let (start_row, start_col) = (start_row as usize, start_col as usize);
    let total_cols = start_col + width;

    let mut grid: Grid = Vec::with_capacity(start_row + height);
    grid.resize_with(start_row, || vec![String::new(); total_cols]);

    for row in range.rows() {
        let mut cells = vec![String::new(); start_col];
        cells.extend(row.iter().map(cell_to_string));
        grid.push(cells);
    }

    debug!(
        sheet = %sheet_name,
        rows = grid.len(),
        cols = total_cols,
        "read workbook sheet"
    );
    Ok(grid)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            // Integers without decimals, so "75001" stays "75001"
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => format!("{}", n),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        // Error cells carry no usable value
        Data::Error(_) => String::new(),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}
