//! Header resolution for station spreadsheets.
//!
//! Each logical field accepts a handful of header spellings: the Russian
//! headers of the operator's export and plain English names. Matching is
//! trimmed and case-insensitive.

use std::collections::HashMap;

use crate::error::{Error, Result};

pub const ID: &[&str] = &["ИД базовой станции", "id", "station_id"];
pub const LATITUDE: &[&str] = &["Широта", "latitude", "lat"];
pub const LONGITUDE: &[&str] = &["Долгота", "longitude", "lon", "lng"];
pub const COORDINATES: &[&str] = &["Координаты установки", "coordinates"];
pub const NAME: &[&str] = &["Название БС", "name"];
pub const COVERAGE: &[&str] = &["Площадь зоны покрытия, кв.км", "coverage_area_km2"];
pub const FREQUENCY: &[&str] = &["Частота,Гц", "frequency_hz"];
pub const ANTENNA: &[&str] = &["Тип антенны", "antenna_type"];
pub const HANDOVER: &[&str] = &["Диапазон показателей хэндовера", "handover_range"];
pub const STANDARD: &[&str] = &["Стандарт", "standard"];

/// Where a row's location comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Split { latitude: usize, longitude: usize },
    Combined(usize),
}

/// Column indices for every field found in the header row.
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    pub headers: Vec<String>,
    pub id: usize,
    pub location: Location,
    pub name: Option<usize>,
    pub coverage: Option<usize>,
    pub frequency: Option<usize>,
    pub antenna: Option<usize>,
    pub handover: Option<usize>,
    pub standard: Option<usize>,
}

fn normalize(header: &str) -> String {
    header.trim().to_lowercase()
}

impl ColumnMapping {
    /// Resolves the header row into column indices.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumns`] listing the first accepted header of
    /// every required field that could not be found.
    pub fn resolve(headers: Vec<String>) -> Result<Self> {
        let mut name_to_index = HashMap::new();
        for (index, header) in headers.iter().enumerate() {
            name_to_index.entry(normalize(header)).or_insert(index);
        }

        let find = |aliases: &[&str]| {
            aliases
                .iter()
                .find_map(|alias| name_to_index.get(&normalize(alias)).copied())
        };

        let id = find(ID);
        let location = match (find(LATITUDE), find(LONGITUDE), find(COORDINATES)) {
            (Some(latitude), Some(longitude), _) => Some(Location::Split {
                latitude,
                longitude,
            }),
            (_, _, Some(combined)) => Some(Location::Combined(combined)),
            _ => None,
        };

        let (Some(id), Some(location)) = (id, location) else {
            let mut missing = Vec::new();
            if id.is_none() {
                missing.push(ID[0].to_string());
            }
            if location.is_none() {
                missing.push(format!("{} + {} or {}", LATITUDE[0], LONGITUDE[0], COORDINATES[0]));
            }
            return Err(Error::MissingColumns {
                missing,
                present: headers,
            });
        };

        Ok(ColumnMapping {
            id,
            location,
            name: find(NAME),
            coverage: find(COVERAGE),
            frequency: find(FREQUENCY),
            antenna: find(ANTENNA),
            handover: find(HANDOVER),
            standard: find(STANDARD),
            headers,
        })
    }

    /// Header text of a column, for error messages.
    pub fn header(&self, index: usize) -> &str {
        self.headers.get(index).map_or("", |h| h.trim())
    }
}
