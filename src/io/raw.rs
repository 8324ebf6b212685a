//! Raw grid → named numeric columns.
//!
//! File readers (CSV, spreadsheets, JSON tables) hand us a grid of loosely typed
//! cells. This module turns that grid into an ordered list of `(name, values)`
//! columns, or explains exactly which cell is wrong.
//!
//! Rules:
//! - trailing blank cells of every row are dropped, then trailing blank rows
//! - the first row is a header iff every cell in it is a non-blank, non-numeric
//!   string; without a header, columns are named `"1"`, `"2"`, …
//! - after trimming, every row must have the same width
//! - every remaining cell must be numeric (numbers, or text that parses as one)
//!
//! Row and column numbers in errors are 1-based positions in the original grid.

use tracing::debug;

use crate::error::{Error, Result};

/// A single raw cell as supplied by a file reader.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// Blank cells: `Empty` or whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Numeric value of the cell, if it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
            Cell::Empty => None,
        }
    }

    fn is_header_like(&self) -> bool {
        matches!(self, Cell::Text(_)) && !self.is_blank() && self.as_number().is_none()
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{v}"),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Empty => write!(f, "<empty>"),
        }
    }
}

/// Named numeric columns, in grid order.
pub type Columns = Vec<(String, Vec<f64>)>;

/// Converts raw cell grids into numeric columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawDataBuilder;

impl RawDataBuilder {
    pub fn build(grid: Vec<Vec<Cell>>) -> Result<Columns> {
        let rows = trim_grid(grid);
        let Some(first) = rows.first() else {
            return Err(Error::InvalidData("no data found in table".to_string()));
        };
        let width = first.len();

        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != width) {
            return Err(Error::InvalidData(format!(
                "row {} has {} cells but the table has {width} columns",
                idx + 1,
                row.len()
            )));
        }

        let has_header = first.iter().all(Cell::is_header_like);
        let (names, body_start) = if has_header {
            (header_names(first)?, 1)
        } else {
            ((1..=width).map(|i| i.to_string()).collect(), 0)
        };

        let mut columns: Columns = names.into_iter().map(|name| (name, Vec::new())).collect();
        for (row_idx, row) in rows.iter().enumerate().skip(body_start) {
            for (col_idx, cell) in row.iter().enumerate() {
                let value = cell.as_number().ok_or_else(|| {
                    Error::InvalidData(format!(
                        "cell at row {}, column {} should be a number, got {cell:?}",
                        row_idx + 1,
                        col_idx + 1
                    ))
                })?;
                columns[col_idx].1.push(value);
            }
        }

        debug!(
            columns = width,
            records = rows.len() - body_start,
            has_header,
            "built columns from raw grid"
        );
        Ok(columns)
    }
}

/// Drop trailing rows that are blank throughout, then trailing columns that
/// are blank in every remaining row. Interior blanks are kept.
fn trim_grid(mut rows: Vec<Vec<Cell>>) -> Vec<Vec<Cell>> {
    while rows.last().is_some_and(|row| row.iter().all(Cell::is_blank)) {
        rows.pop();
    }
    let width = rows
        .iter()
        .filter_map(|row| row.iter().rposition(|cell| !cell.is_blank()))
        .map(|last| last + 1)
        .max()
        .unwrap_or(0);
    for row in &mut rows {
        row.truncate(width);
    }
    rows
}

fn header_names(row: &[Cell]) -> Result<Vec<String>> {
    let mut names: Vec<String> = Vec::with_capacity(row.len());
    for cell in row {
        let name = cell.to_string().trim().to_string();
        if names.contains(&name) {
            return Err(Error::InvalidData(format!("duplicate header {name:?}")));
        }
        names.push(name);
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn header_row_names_columns() {
        let grid = vec![
            vec![text("x"), text("y")],
            vec![Cell::Number(1.0), text("2.5")],
            vec![Cell::Number(3.0), Cell::Number(4.0)],
        ];
        let columns = RawDataBuilder::build(grid).unwrap();
        assert_eq!(
            columns,
            vec![
                ("x".to_string(), vec![1.0, 3.0]),
                ("y".to_string(), vec![2.5, 4.0]),
            ]
        );
    }

    #[test]
    fn numeric_first_row_is_data() {
        let grid = vec![
            vec![text("1"), text("2")],
            vec![text("3"), text("4")],
        ];
        let columns = RawDataBuilder::build(grid).unwrap();
        assert_eq!(columns[0], ("1".to_string(), vec![1.0, 3.0]));
        assert_eq!(columns[1], ("2".to_string(), vec![2.0, 4.0]));
    }

    #[test]
    fn partially_textual_first_row_is_not_a_header() {
        let grid = vec![vec![text("a"), Cell::Number(1.0)]];
        let err = RawDataBuilder::build(grid).unwrap_err();
        assert!(err.to_string().contains("row 1, column 1"), "{err}");
    }

    #[test]
    fn trailing_blank_rows_and_columns_are_trimmed() {
        let grid = vec![
            vec![text("a"), text("b"), Cell::Empty],
            vec![Cell::Number(1.0), Cell::Number(2.0), text("  ")],
            vec![Cell::Empty, Cell::Empty],
            vec![],
        ];
        let columns = RawDataBuilder::build(grid).unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[1], ("b".to_string(), vec![2.0]));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let grid = vec![
            vec![text("a"), text("b")],
            vec![Cell::Number(1.0)],
        ];
        let err = RawDataBuilder::build(grid).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidData("row 2 has 1 cells but the table has 2 columns".to_string())
        );
    }

    #[test]
    fn bad_cell_reports_coordinates() {
        let grid = vec![
            vec![text("a"), text("b")],
            vec![Cell::Number(1.0), Cell::Number(2.0)],
            vec![Cell::Number(3.0), text("oops")],
        ];
        let err = RawDataBuilder::build(grid).unwrap_err();
        assert!(err.to_string().contains("row 3, column 2"), "{err}");
        assert!(err.to_string().contains("oops"), "{err}");
    }

    #[test]
    fn blank_cell_inside_table_is_rejected() {
        let grid = vec![
            vec![text("a"), text("b")],
            vec![Cell::Empty, Cell::Number(2.0)],
        ];
        let err = RawDataBuilder::build(grid).unwrap_err();
        assert!(err.to_string().contains("row 2, column 1"), "{err}");
    }

    #[test]
    fn blank_cell_in_last_column_is_rejected() {
        let grid = vec![
            vec![text("a"), text("b")],
            vec![Cell::Number(1.0), Cell::Number(2.0)],
            vec![Cell::Number(3.0), Cell::Empty],
        ];
        let err = RawDataBuilder::build(grid).unwrap_err();
        assert!(err.to_string().contains("row 3, column 2"), "{err}");
    }

    #[test]
    fn blank_row_inside_table_is_rejected() {
        let grid = vec![
            vec![text("a"), text("b")],
            vec![Cell::Empty, Cell::Empty],
            vec![Cell::Number(1.0), Cell::Number(2.0)],
        ];
        let err = RawDataBuilder::build(grid).unwrap_err();
        assert!(err.to_string().contains("row 2, column 1"), "{err}");
    }

    #[test]
    fn empty_grid_and_duplicate_headers_fail() {
        assert!(RawDataBuilder::build(vec![vec![Cell::Empty]]).is_err());

        let grid = vec![vec![text("a"), text("a")], vec![Cell::Number(1.0), Cell::Number(2.0)]];
        assert_eq!(
            RawDataBuilder::build(grid).unwrap_err(),
            Error::InvalidData("duplicate header \"a\"".to_string())
        );
    }
}
