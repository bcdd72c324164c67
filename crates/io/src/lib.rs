// Spreadsheet reading: first sheet of a workbook, or a delimited text file,
// flattened into a grid of cell strings.

pub mod csv;
pub mod error;
pub mod sheet;
pub mod xlsx;

pub use error::IoError;
pub use sheet::{read_grid, Grid, SourceFormat};
