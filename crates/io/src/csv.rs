// Delimited text import (CSV/TSV)

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::IoError;
use crate::sheet::Grid;

/// Read a delimited file, sniffing the delimiter from its first lines.
pub fn read(path: &Path) -> Result<Grid, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    debug!(path = %path.display(), delimiter = %(delimiter as char).escape_default(), "sniffed delimiter");
    grid_from_str(&content, delimiter)
}

pub fn read_with_delimiter(path: &Path, delimiter: u8) -> Result<Grid, IoError> {
    let content = read_file_as_utf8(path)?;
    grid_from_str(&content, delimiter)
}

/// Guess the delimiter of a contact export. Spreadsheet tools in French or
/// Turkish locales save with `;`, others with `,`; tab and pipe also occur.
///
/// Each candidate is scored on the first lines: the header's field count
/// times the number of lines sharing it. A candidate that leaves the header
/// in one piece is out. On a tie the earlier candidate stays; comma is the
/// fallback.
fn sniff_delimiter(content: &str) -> u8 {
    const CANDIDATES: [u8; 4] = [b'\t', b';', b',', b'|'];
    const SAMPLE_LINES: usize = 10;

    let sample: Vec<&str> = content.lines().take(SAMPLE_LINES).collect();
    let Some(header) = sample.first() else {
        return b',';
    };

    CANDIDATES
        .iter()
        .filter_map(|&delim| {
            let columns = field_count(header, delim);
            if columns <= 1 {
                return None;
            }
            let agreeing = sample
                .iter()
                .filter(|line| field_count(line, delim) == columns)
                .count();
            Some((delim, agreeing * columns))
        })
        .fold(None, |best: Option<(u8, usize)>, (delim, score)| match best {
            Some((_, top)) if top >= score => best,
            _ => Some((delim, score)),
        })
        .map_or(b',', |(delim, _)| delim)
}

fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
        .map(|r| r.len())
        .unwrap_or(1)
}

/// Read file and convert to UTF-8 if needed (Windows-1252 exports from Excel).
/// A leading byte-order mark is dropped.
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let read_err = |source: std::io::Error| IoError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::open(path).map_err(read_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(read_err)?;

    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            debug!(path = %path.display(), "not UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match content.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => content,
    })
}

fn grid_from_str(content: &str, delimiter: u8) -> Result<Grid, IoError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut grid = Grid::new();
    for result in reader.records() {
        let record = result?;
        grid.push(record.iter().map(str::to_string).collect());
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, bytes: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        (dir, path)
    }

    #[test]
    fn sniff_common_delimiters() {
        assert_eq!(sniff_delimiter("a,b,c\n1,2,3\n"), b',');
        assert_eq!(sniff_delimiter("nom;adresse;cp\nJean;12 Rue;75001\n"), b';');
        assert_eq!(sniff_delimiter("a\tb\n1\t2\n"), b'\t');
        assert_eq!(sniff_delimiter("a|b|c\n1|2|3\n"), b'|');
        assert_eq!(sniff_delimiter(""), b',');
        assert_eq!(sniff_delimiter("single column\n"), b',');
    }

    #[test]
    fn sniff_tie_keeps_earlier_candidate() {
        // Both split the header in two; semicolon comes before comma
        assert_eq!(sniff_delimiter("nom;adresse, cp\n"), b';');
        // Comma agrees on more lines, so it wins despite the order
        assert_eq!(sniff_delimiter("a;b,c\n1,2\n3,4\n"), b',');
    }

    #[test]
    fn sniff_ignores_commas_inside_semicolon_fields() {
        let content = "nom;adresse;cp\nDupont, Jean;12 Rue, Bat A;75001\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn reads_semicolon_file() {
        let (_dir, path) = write_temp(
            "contacts.csv",
            "Nom;Adresse;CP\nJean Dupont;\"12 Rue de Paris; Bat A\";75001\nMarie Curie;;75005\n"
                .as_bytes(),
        );
        let grid = read(&path).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[1], vec!["Jean Dupont", "12 Rue de Paris; Bat A", "75001"]);
        assert_eq!(grid[2][1], "");
    }

    #[test]
    fn ragged_rows_are_kept() {
        let (_dir, path) = write_temp("ragged.csv", b"a,b,c\n1\n1,2\n");
        let grid = read(&path).unwrap();
        assert_eq!(grid[1], vec!["1"]);
        assert_eq!(grid[2], vec!["1", "2"]);
    }

    #[test]
    fn windows_1252_fallback() {
        // "Fiche créée" in Windows-1252
        let (_dir, path) = write_temp("latin.csv", b"nom,statut\nJean,Fiche cr\xe9\xe9e\n");
        let grid = read(&path).unwrap();
        assert_eq!(grid[1][1], "Fiche créée");
    }

    #[test]
    fn strips_byte_order_mark() {
        let (_dir, path) = write_temp("bom.csv", "\u{feff}Nom,CP\nJean,75001\n".as_bytes());
        let grid = read(&path).unwrap();
        assert_eq!(grid[0][0], "Nom");
    }

    #[test]
    fn explicit_tab_delimiter() {
        let (_dir, path) = write_temp("contacts.tsv", b"Jean, Dupont\t75001\n");
        let grid = read_with_delimiter(&path, b'\t').unwrap();
        assert_eq!(grid, vec![vec!["Jean, Dupont".to_string(), "75001".to_string()]]);
    }
}
