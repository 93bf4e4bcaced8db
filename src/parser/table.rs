//! Format-neutral grid of cells read from a csv file or a workbook sheet.

use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};

/// Which worksheet of a workbook to read. Ignored for csv input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SheetSelector {
    #[default]
    First,
    Named(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    /// Spreadsheet error value such as `#DIV/0!`.
    Error(String),
}

impl Cell {
    fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(text.to_string())
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            Data::Bool(b) => Cell::Text(b.to_string()),
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from_text(s),
            Data::Error(e) => Cell::Error(e.to_string()),
        }
    }
}

/// One non-empty line of the file, tagged with its 1-based row number.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub number: usize,
    pub cells: Vec<Cell>,
}

/// Rows in file order. Leading and interior empty lines the reader skips
/// leave gaps in the row numbers.
#[derive(Debug, Default)]
pub struct Grid {
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Delimited,
    Workbook,
}

fn detect_format(path: &Path) -> Result<Format> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("csv" | "tsv" | "txt") => Ok(Format::Delimited),
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "xla" | "xlam" | "ods") => Ok(Format::Workbook),
        _ => Err(Error::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Reads every row of the file into a [`Grid`].
pub fn read_grid(path: &Path, sheet: &SheetSelector, delimiter: u8) -> Result<Grid> {
    match detect_format(path)? {
        Format::Delimited => {
            let is_tsv = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
            read_delimited(path, if is_tsv { b'\t' } else { delimiter })
        }
        Format::Workbook => read_workbook(path, sheet),
    }
}

fn read_delimited(path: &Path, delimiter: u8) -> Result<Grid> {
    let data = std::fs::read(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(data.as_slice());

    let mut rows: Vec<Row> = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let mut cells: Vec<Cell> = record.iter().map(Cell::from_text).collect();
        if rows.is_empty() {
            if let (Some(cell), Some(first)) = (cells.first_mut(), record.get(0)) {
                *cell = Cell::from_text(first.trim_start_matches('\u{feff}'));
            }
        }
        let number = record
            .position()
            .map_or(index + 1, |pos| record_line(&data, pos));
        rows.push(Row { number, cells });
    }

    debug!(rows = rows.len(), delimiter = %(delimiter as char), "Read delimited file");
    Ok(Grid { rows })
}

/// Line a record starts on. The csv reader positions a record where reading
/// began, before any empty lines it skipped on the way.
fn record_line(data: &[u8], pos: &csv::Position) -> usize {
    let skipped = data
        .get(pos.byte() as usize..)
        .unwrap_or_default()
        .iter()
        .take_while(|b| matches!(b, b'\n' | b'\r'))
        .filter(|&&b| b == b'\n')
        .count();
    pos.line() as usize + skipped
}

fn read_workbook(path: &Path, sheet: &SheetSelector) -> Result<Grid> {
    let mut workbook = open_workbook_auto(path)?;

    let range = match sheet {
        SheetSelector::First => workbook.worksheet_range_at(0).transpose()?,
        SheetSelector::Named(name) => Some(workbook.worksheet_range(name)?),
    };

    let Some(range) = range else {
        debug!("Workbook has no sheets");
        return Ok(Grid::default());
    };

    // The range starts at the first used row, not at row 1.
    let first_row = range.start().map_or(1, |(row, _)| row as usize + 1);
    let rows: Vec<Row> = range
        .rows()
        .enumerate()
        .map(|(offset, cells)| Row {
            number: first_row + offset,
            cells: cells.iter().map(Cell::from).collect(),
        })
        .collect();

    debug!(rows = rows.len(), first_row, ?sheet, "Read workbook sheet");
    Ok(Grid { rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("a.CSV")).unwrap(), Format::Delimited);
        assert_eq!(detect_format(Path::new("a.xlsx")).unwrap(), Format::Workbook);
        assert!(matches!(
            detect_format(Path::new("a.pdf")),
            Err(Error::UnsupportedFormat { .. })
        ));
        assert!(detect_format(Path::new("no_extension")).is_err());
    }

    #[test]
    fn test_read_delimited_keeps_row_order() {
        let file = write_temp(".csv", "id,lat\nS1,1\nS2,2\n");
        let grid = read_grid(file.path(), &SheetSelector::First, b',').unwrap();

        assert_eq!(grid.rows.len(), 3);
        assert_eq!(grid.rows[0].number, 1);
        assert_eq!(grid.rows[1].cells[0], Cell::Text("S1".to_string()));
        assert_eq!(grid.rows[2].cells[0], Cell::Text("S2".to_string()));
    }

    #[test]
    fn test_read_delimited_strips_bom_and_blanks() {
        let file = write_temp(".csv", "\u{feff}id;lat\nS1; \n");
        let grid = read_grid(file.path(), &SheetSelector::First, b';').unwrap();

        assert_eq!(grid.rows[0].cells[0], Cell::Text("id".to_string()));
        assert!(grid.rows[1].cells[1].is_blank());
    }

    #[test]
    fn test_tsv_uses_tab_delimiter() {
        let file = write_temp(".tsv", "id\tlat\nS1\t1\n");
        let grid = read_grid(file.path(), &SheetSelector::First, b',').unwrap();

        assert_eq!(grid.rows[0].cells.len(), 2);
    }

    #[test]
    fn test_read_delimited_numbers_rows_by_file_line() {
        let file = write_temp(".csv", "\nid,lat\n\nS1,1\n");
        let grid = read_grid(file.path(), &SheetSelector::First, b',').unwrap();

        let numbers: Vec<_> = grid.rows.iter().map(|r| r.number).collect();
        assert_eq!(numbers, vec![2, 4]);
    }

    #[test]
    fn test_cell_from_workbook_data() {
        assert_eq!(Cell::from(&Data::Int(7)), Cell::Number(7.0));
        assert_eq!(Cell::from(&Data::String("  ".into())), Cell::Empty);
        assert_eq!(Cell::from(&Data::Empty), Cell::Empty);
    }
}
