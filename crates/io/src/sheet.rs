use std::path::Path;

use crate::error::IoError;

/// Grid of cell strings, anchored at A1. Row `i`, column `j` is the sheet
/// cell at 0-based position (i, j). Workbook grids are rectangular; rows
/// read from delimited text keep their own length, so a missing trailing
/// cell reads as absent rather than "".
pub type Grid = Vec<Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// xlsx, xlsm, xlsb, xls, ods. First sheet only.
    Workbook,
    /// Delimited text, delimiter sniffed.
    Csv,
    /// Tab-separated text.
    Tsv,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "xla" | "xlam" | "ods" => Ok(Self::Workbook),
            "csv" | "txt" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "" => Err(IoError::UnsupportedFormat(format!(
                "{} has no file extension",
                path.display()
            ))),
            other => Err(IoError::UnsupportedFormat(format!(".{other}"))),
        }
    }
}

/// Read the first sheet of `path` into a grid. Format follows the extension.
pub fn read_grid(path: &Path) -> Result<Grid, IoError> {
    match SourceFormat::from_path(path)? {
        SourceFormat::Workbook => crate::xlsx::read_first_sheet(path),
        SourceFormat::Csv => crate::csv::read(path),
        SourceFormat::Tsv => crate::csv::read_with_delimiter(path, b'\t'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("a.XLSX")).unwrap(), SourceFormat::Workbook);
        assert_eq!(SourceFormat::from_path(Path::new("a.ods")).unwrap(), SourceFormat::Workbook);
        assert_eq!(SourceFormat::from_path(Path::new("dir/a.csv")).unwrap(), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_path(Path::new("a.tsv")).unwrap(), SourceFormat::Tsv);
    }

    #[test]
    fn unsupported_extensions() {
        let err = SourceFormat::from_path(Path::new("a.pdf")).unwrap_err();
        assert_eq!(err.to_string(), "unsupported file type: .pdf");
        assert!(SourceFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = read_grid(Path::new("/nonexistent/contacts.csv")).unwrap_err();
        assert!(matches!(err, IoError::Read { .. }));
    }
}
