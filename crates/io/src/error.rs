use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("failed to open spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("spreadsheet contains no sheets")]
    NoSheets,

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
}
