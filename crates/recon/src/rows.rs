use crate::config::ColumnMapping;
use crate::model::{Record, Row};

/// Turn a grid of cell strings into rows, applying the column mapping.
///
/// Values are trimmed and empty values omitted. The row number is the 1-based
/// position in the sheet, header rows included. Rows with no mapped value are
/// dropped.
pub fn rows_from_grid<R: AsRef<[String]>>(
    grid: &[R],
    mapping: &ColumnMapping,
    header_rows: usize,
) -> Vec<Row> {
    grid.iter()
        .enumerate()
        .skip(header_rows)
        .filter_map(|(index, cells)| {
            let cells = cells.as_ref();
            let mut record = Record::new();
            for (column, field) in mapping.iter() {
                let value = cells.get(column).map(|v| v.trim()).unwrap_or("");
                if !value.is_empty() {
                    record.set(field, value);
                }
            }
            if record.fields.is_empty() {
                None
            } else {
                Some(Row {
                    number: index + 1,
                    record,
                })
            }
        })
        .collect()
}
