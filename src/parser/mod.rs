//! Spreadsheet parser for base station exports.
//!
//! Reads csv/tsv files with the `csv` crate and workbooks (xlsx, xls, ods)
//! with `calamine`, resolves the header row into a [`ColumnMapping`], and
//! turns every data row into a [`StationRecord`].

mod columns;
mod fields;
mod table;

pub use columns::{ColumnMapping, Location};
pub use table::{Cell, Row, SheetSelector};

use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::station::StationRecord;

/// What to do with a data row that cannot be turned into a station.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowPolicy {
    /// Abort the whole parse on the first bad row.
    #[default]
    Strict,
    /// Record the failure in [`ParseReport::skipped`] and keep going.
    Skip,
}

#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub row_policy: RowPolicy,
    pub sheet: SheetSelector,
    /// Field delimiter for csv input. `.tsv` files always use a tab.
    pub delimiter: u8,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            row_policy: RowPolicy::Strict,
            sheet: SheetSelector::First,
            delimiter: b',',
        }
    }
}

/// A data row that was left out under [`RowPolicy::Skip`].
#[derive(Debug, Clone, Serialize)]
pub struct RowError {
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ParseReport {
    pub stations: Vec<StationRecord>,
    pub skipped: Vec<RowError>,
}

/// Stateless apart from its options; one instance can parse any number of
/// files, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct StationParser {
    options: ParseOptions,
}

/// Parses `path` with the default options and the strict row policy.
///
/// # Errors
///
/// See [`StationParser::parse`].
pub fn parse(path: impl AsRef<Path>) -> Result<Vec<StationRecord>> {
    Ok(StationParser::default().parse(path)?.stations)
}

impl StationParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Reads the spreadsheet at `path` into station records in file row order.
    ///
    /// A file without any rows, or with only a header row, yields no stations.
    ///
    /// # Errors
    ///
    /// - [`Error::FileNotFound`] when `path` does not exist.
    /// - [`Error::EmptyHeader`] when the first row has no header text.
    /// - [`Error::MissingColumns`] when id or location columns are absent.
    /// - [`Error::InvalidCell`] for a bad row under [`RowPolicy::Strict`].
    /// - [`Error::UnsupportedFormat`], [`Error::Csv`], [`Error::Spreadsheet`]
    ///   or [`Error::Io`] when the file cannot be read.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display(), policy = ?self.options.row_policy))]
    pub fn parse(&self, path: impl AsRef<Path>) -> Result<ParseReport> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let grid = table::read_grid(path, &self.options.sheet, self.options.delimiter)?;
        let mut rows = grid.rows.into_iter();

        let Some(header_row) = rows.next() else {
            warn!("Spreadsheet has no rows");
            return Ok(ParseReport::default());
        };

        // Readers drop leading empty lines, so a header past row 1 means row 1 was blank.
        if header_row.number != 1 || header_row.cells.iter().all(Cell::is_blank) {
            return Err(Error::EmptyHeader {
                path: path.to_path_buf(),
            });
        }

        let headers = header_row
            .cells
            .iter()
            .map(|cell| fields::text(cell).ok().flatten().unwrap_or_default())
            .collect();
        let mapping = ColumnMapping::resolve(headers)?;
        debug!(?mapping, "Resolved columns");

        let mut report = ParseReport::default();
        for row in rows {
            let row_number = row.number;

            if row.cells.iter().all(Cell::is_blank) {
                debug!(row = row_number, "Skipping blank row");
                continue;
            }

            match build_station(&mapping, &row.cells, row_number) {
                Ok(station) => report.stations.push(station),
                Err(e) if self.options.row_policy == RowPolicy::Skip => {
                    warn!(row = row_number, error = %e, "Skipping invalid row");
                    report.skipped.push(RowError {
                        row: row_number,
                        message: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            stations = report.stations.len(),
            skipped = report.skipped.len(),
            "Spreadsheet parsed"
        );
        Ok(report)
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

fn build_station(mapping: &ColumnMapping, row: &[Cell], row_number: usize) -> Result<StationRecord> {
    let cell = |index: usize| row.get(index).unwrap_or(&EMPTY_CELL);
    let invalid = |index: usize, reason: String| Error::InvalidCell {
        row: row_number,
        column: mapping.header(index).to_string(),
        reason,
    };

    let id = fields::id(cell(mapping.id)).map_err(|r| invalid(mapping.id, r))?;

    let (latitude, longitude) = match mapping.location {
        Location::Split {
            latitude,
            longitude,
        } => (
            fields::required_float(cell(latitude)).map_err(|r| invalid(latitude, r))?,
            fields::required_float(cell(longitude)).map_err(|r| invalid(longitude, r))?,
        ),
        Location::Combined(index) => {
            fields::coordinates(cell(index)).map_err(|r| invalid(index, r))?
        }
    };

    let mut station = StationRecord::new(id, latitude, longitude).map_err(|e| match e {
        Error::Validation { message } => Error::InvalidCell {
            row: row_number,
            column: mapping.header(mapping.id).to_string(),
            reason: message,
        },
        other => other,
    })?;

    if let Some(index) = mapping.name {
        if let Some(name) = fields::text(cell(index)).map_err(|r| invalid(index, r))? {
            station = station.with_name(name);
        }
    }
    if let Some(index) = mapping.coverage {
        if let Some(area) = fields::float(cell(index)).map_err(|r| invalid(index, r))? {
            station = station.with_coverage_area_km2(area);
        }
    }
    if let Some(index) = mapping.frequency {
        if let Some(hz) = fields::frequency(cell(index)).map_err(|r| invalid(index, r))? {
            station = station.with_frequency_hz(hz);
        }
    }
    if let Some(index) = mapping.antenna {
        if let Some(antenna) = fields::text(cell(index)).map_err(|r| invalid(index, r))? {
            station = station.with_antenna_type(antenna);
        }
    }
    if let Some(range) = mapping.handover.and_then(|index| fields::handover_range(cell(index))) {
        station = station.with_handover_range(range);
    }
    if let Some(index) = mapping.standard {
        if let Some(standard) = fields::text(cell(index)).map_err(|r| invalid(index, r))? {
            station = station.with_standard(standard);
        }
    }

    Ok(station)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_two_rows_in_order() {
        let file = csv_file("id,latitude,longitude\nS1,59.93,30.33\nS2,59.94,30.34\n");
        let stations = parse(file.path()).unwrap();

        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].id(), "S1");
        assert_eq!(stations[0].latitude(), 59.93);
        assert_eq!(stations[1].id(), "S2");
        assert_eq!(stations[1].longitude(), 30.34);
    }

    #[test]
    fn test_parse_header_only_is_empty() {
        let file = csv_file("id,latitude,longitude\n");
        assert!(parse(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_parse_empty_file_is_empty() {
        let file = csv_file("");
        assert!(parse(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_parse_blank_header_row() {
        let file = csv_file(",,\nS1,59.93,30.33\n");
        assert!(matches!(
            parse(file.path()),
            Err(Error::EmptyHeader { .. })
        ));
    }

    #[test]
    fn test_parse_empty_first_line_is_blank_header() {
        let file = csv_file("\nS1,59.93,30.33\n");
        assert!(matches!(
            parse(file.path()),
            Err(Error::EmptyHeader { .. })
        ));
    }

    #[test]
    fn test_parse_reports_file_line_after_blank_lines() {
        let file = csv_file("id,latitude,longitude\n\nS1,59.93,30.33\n\nS2,north,30.34\n");
        match parse(file.path()) {
            Err(Error::InvalidCell { row, .. }) => assert_eq!(row, 5),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_parse_missing_file() {
        let result = parse("/definitely/not/here/stations.xlsx");
        assert!(matches!(result, Err(Error::FileNotFound { .. })));
    }

    #[test]
    fn test_parse_missing_columns() {
        let file = csv_file("id,name\nS1,Alpha\n");
        assert!(matches!(
            parse(file.path()),
            Err(Error::MissingColumns { .. })
        ));
    }

    #[test]
    fn test_parse_strict_aborts_on_bad_coordinate() {
        let file = csv_file("id,latitude,longitude\nS1,59.93,30.33\nS2,north,30.34\n");
        match parse(file.path()) {
            Err(Error::InvalidCell { row, column, .. }) => {
                assert_eq!(row, 3);
                assert_eq!(column, "latitude");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_parse_skip_policy_records_bad_rows() {
        let file = csv_file("id,latitude,longitude\nS1,59.93,30.33\n,59.0,30.0\nS3,59.95,200\nS4,1,2\n");
        let parser = StationParser::new(ParseOptions {
            row_policy: RowPolicy::Skip,
            ..Default::default()
        });

        let report = parser.parse(file.path()).unwrap();

        let ids: Vec<_> = report.stations.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec!["S1", "S4"]);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].row, 3);
        assert_eq!(report.skipped[1].row, 4);
    }

    #[test]
    fn test_parse_ignores_blank_rows() {
        let file = csv_file("id,latitude,longitude\nS1,1,2\n,,\nS2,3,4\n");
        assert_eq!(parse(file.path()).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_full_export_columns() {
        let file = csv_file(concat!(
            "ИД базовой станции;Название БС;Площадь зоны покрытия, кв.км;Частота,Гц;",
            "Тип антенны;Диапазон показателей хэндовера;Стандарт;Координаты установки\n",
            "1;Station1;10,5;2400000000;Type A;от 12 до 18;5G;55.7558,37.6173\n",
            "2;Station2;;2500000000;Type B;n/a;4G;55.7559,37.6174\n",
        ));
        let parser = StationParser::new(ParseOptions {
            delimiter: b';',
            ..Default::default()
        });

        let stations = parser.parse(file.path()).unwrap().stations;

        assert_eq!(stations.len(), 2);
        let first = &stations[0];
        assert_eq!(first.id(), "1");
        assert_eq!(first.name(), Some("Station1"));
        assert_eq!(first.coverage_area_km2(), Some(10.5));
        assert_eq!(first.frequency_hz(), Some(2_400_000_000));
        assert_eq!(first.antenna_type(), Some("Type A"));
        assert_eq!(first.standard(), Some("5G"));
        assert_eq!(first.latitude(), 55.7558);
        let range = first.handover_range().unwrap();
        assert_eq!((range.min, range.max), (12.0, 18.0));

        assert_eq!(stations[1].coverage_area_km2(), None);
        assert_eq!(stations[1].handover_range(), None);
    }

    #[test]
    fn test_parse_short_row_treats_missing_cells_as_blank() {
        let file = csv_file("id,latitude,longitude,name\nS1,1,2\n");
        let stations = parse(file.path()).unwrap();
        assert_eq!(stations[0].name(), None);
    }
}
