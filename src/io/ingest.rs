//! CSV ingest into a raw cell grid.
//!
//! This is deliberately thin: the CSV reader only splits the file into cells.
//! Header detection and numeric validation happen in [`crate::io::raw`] so every
//! tabular source shares the same rules.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::io::raw::Cell;

/// Read a CSV file into a grid of cells.
pub fn read_csv_grid(path: &Path) -> Result<Vec<Vec<Cell>>> {
    let file = File::open(path)
        .map_err(|e| Error::Io(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let grid = read_csv_grid_from(file)?;
    debug!(path = %path.display(), rows = grid.len(), "read CSV grid");
    Ok(grid)
}

/// Read CSV text from any reader into a grid of cells.
///
/// Rows may have different widths; rectangularity is checked later, after
/// trailing blanks are trimmed.
pub fn read_csv_grid_from<R: Read>(reader: R) -> Result<Vec<Vec<Cell>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut grid = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| Error::Io(format!("CSV parse error on line {}: {e}", idx + 1)))?;
        grid.push(record.iter().map(to_cell).collect());
    }
    Ok(grid)
}

fn to_cell(field: &str) -> Cell {
    // Excel sometimes prefixes the first field with a UTF-8 BOM.
    let field = field.trim_start_matches('\u{feff}');
    if field.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(field.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::raw::RawDataBuilder;

    #[test]
    fn csv_text_becomes_columns() {
        let csv = "\u{feff}x, y\n1, 2\n3,4\n,\n";
        let grid = read_csv_grid_from(csv.as_bytes()).unwrap();
        assert_eq!(grid[0], vec![Cell::Text("x".into()), Cell::Text("y".into())]);
        assert_eq!(grid[3], vec![Cell::Empty, Cell::Empty]);

        let columns = RawDataBuilder::build(grid).unwrap();
        assert_eq!(columns[0], ("x".to_string(), vec![1.0, 3.0]));
        assert_eq!(columns[1], ("y".to_string(), vec![2.0, 4.0]));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_csv_grid(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
