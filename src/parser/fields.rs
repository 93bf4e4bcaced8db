//! Cell-level conversions. Each returns the reason text on failure; the row
//! builder attaches the row number and column header.

use super::table::Cell;
use crate::station::HandoverRange;

type FieldResult<T> = std::result::Result<T, String>;

fn parse_decimal(text: &str) -> FieldResult<f64> {
    let value = text
        .trim()
        .replace(' ', "")
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| format!("'{}' is not a number", text.trim()))?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("'{}' is not a finite number", text.trim()))
    }
}

/// Whole numbers are rendered without a fractional part, so an id stored as
/// a numeric cell (`1.0`) reads back as `"1"`.
fn render_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

pub fn id(cell: &Cell) -> FieldResult<String> {
    match cell {
        Cell::Empty => Err("station id is empty".to_string()),
        Cell::Text(text) => Ok(text.trim().to_string()),
        Cell::Number(value) => Ok(render_number(*value)),
        Cell::Error(e) => Err(format!("cell holds spreadsheet error {e}")),
    }
}

pub fn text(cell: &Cell) -> FieldResult<Option<String>> {
    match cell {
        Cell::Empty => Ok(None),
        Cell::Text(text) => Ok(Some(text.trim().to_string())),
        Cell::Number(value) => Ok(Some(render_number(*value))),
        Cell::Error(e) => Err(format!("cell holds spreadsheet error {e}")),
    }
}

pub fn float(cell: &Cell) -> FieldResult<Option<f64>> {
    match cell {
        Cell::Empty => Ok(None),
        Cell::Number(value) if value.is_finite() => Ok(Some(*value)),
        Cell::Number(value) => Err(format!("{value} is not a finite number")),
        Cell::Text(text) => parse_decimal(text).map(Some),
        Cell::Error(e) => Err(format!("cell holds spreadsheet error {e}")),
    }
}

pub fn required_float(cell: &Cell) -> FieldResult<f64> {
    float(cell)?.ok_or_else(|| "value is empty".to_string())
}

pub fn frequency(cell: &Cell) -> FieldResult<Option<u64>> {
    match float(cell)? {
        None => Ok(None),
        // `u64::MAX as f64` rounds up to 2^64, which itself does not fit.
        Some(value) if value >= u64::MAX as f64 => Err(format!("{value} Hz is out of range")),
        Some(value) if value >= 0.0 && value.fract() == 0.0 => Ok(Some(value as u64)),
        Some(value) => Err(format!("{value} is not a whole number of hertz")),
    }
}

/// Parses a combined `"lat,lon"` cell. `;` separates the pair when the
/// numbers themselves use decimal commas (`"55,75; 37,61"`); whitespace also
/// works as a separator.
pub fn coordinates(cell: &Cell) -> FieldResult<(f64, f64)> {
    let text = match cell {
        Cell::Text(text) => text.trim(),
        Cell::Empty => return Err("coordinates are empty".to_string()),
        Cell::Number(value) => return Err(format!("{value} is not a coordinate pair")),
        Cell::Error(e) => return Err(format!("cell holds spreadsheet error {e}")),
    };

    let parts: Vec<&str> = if text.contains(';') {
        text.split(';').collect()
    } else if text.matches(',').count() == 1 {
        text.split(',').collect()
    } else {
        text.split_whitespace().collect()
    };

    match parts.as_slice() {
        [lat, lon] => Ok((parse_decimal(lat)?, parse_decimal(lon)?)),
        _ => Err(format!("'{text}' is not a coordinate pair")),
    }
}

pub fn handover_range(cell: &Cell) -> Option<HandoverRange> {
    match cell {
        Cell::Text(text) => HandoverRange::parse(text),
        _ => None,
    }
}
