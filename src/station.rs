//! Base station records as read from a spreadsheet row.

use serde::Serialize;
use std::f64::consts::PI;

use crate::error::{Error, Result};

/// Acceptable handover band for a station, as written in the spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HandoverRange {
    pub min: f64,
    pub max: f64,
}

impl HandoverRange {
    /// Parses ranges such as `"12-18"`, `"от 11 до 19"` or `"12,5-18,7"`.
    ///
    /// Returns `None` for blank or unrecognised text; the column is optional
    /// so an unreadable band is treated the same as a missing one.
    pub fn parse(text: &str) -> Option<Self> {
        let normalized = text
            .trim()
            .to_lowercase()
            .replace(' ', "")
            .replace("от", "")
            .replace("до", "-");

        if normalized.is_empty() {
            return None;
        }

        let (min, max) = normalized.split_once('-')?;
        if max.contains('-') {
            return None;
        }

        let min = min.replace(',', ".").parse::<f64>().ok()?;
        let max = max.replace(',', ".").parse::<f64>().ok()?;

        Some(Self { min, max })
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// One base station. Built once per parsed row and never mutated; the
/// `with_*` methods consume the record and hand back an extended copy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRecord {
    id: String,
    latitude: f64,
    longitude: f64,
    name: Option<String>,
    coverage_area_km2: Option<f64>,
    frequency_hz: Option<u64>,
    antenna_type: Option<String>,
    handover_range: Option<HandoverRange>,
    handover_avg: Option<f64>,
    standard: Option<String>,
}

impl StationRecord {
    /// Creates a record with the mandatory identity and location.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the id is blank or the coordinates are
    /// not finite or out of range.
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Result<Self> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(Error::validation("station id must not be empty"));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::validation(format!(
                "station {id}: latitude {latitude} is out of range"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::validation(format!(
                "station {id}: longitude {longitude} is out of range"
            )));
        }

        Ok(Self {
            id,
            latitude,
            longitude,
            name: None,
            coverage_area_km2: None,
            frequency_hz: None,
            antenna_type: None,
            handover_range: None,
            handover_avg: None,
            standard: None,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_coverage_area_km2(mut self, area: f64) -> Self {
        self.coverage_area_km2 = Some(area);
        self
    }

    pub fn with_frequency_hz(mut self, frequency_hz: u64) -> Self {
        self.frequency_hz = Some(frequency_hz);
        self
    }

    pub fn with_antenna_type(mut self, antenna_type: impl Into<String>) -> Self {
        self.antenna_type = Some(antenna_type.into());
        self
    }

    pub fn with_handover_range(mut self, range: HandoverRange) -> Self {
        self.handover_range = Some(range);
        self
    }

    pub fn with_handover_avg(mut self, avg: Option<f64>) -> Self {
        self.handover_avg = avg;
        self
    }

    pub fn with_standard(mut self, standard: impl Into<String>) -> Self {
        self.standard = Some(standard.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn coverage_area_km2(&self) -> Option<f64> {
        self.coverage_area_km2
    }

    pub fn frequency_hz(&self) -> Option<u64> {
        self.frequency_hz
    }

    pub fn antenna_type(&self) -> Option<&str> {
        self.antenna_type.as_deref()
    }

    pub fn handover_range(&self) -> Option<HandoverRange> {
        self.handover_range
    }

    pub fn handover_avg(&self) -> Option<f64> {
        self.handover_avg
    }

    pub fn standard(&self) -> Option<&str> {
        self.standard.as_deref()
    }

    /// `None` when either the band or the measured average is unknown.
    pub fn is_handover_ok(&self) -> Option<bool> {
        let range = self.handover_range?;
        let avg = self.handover_avg?;
        Some(range.contains(avg))
    }

    /// Radius of a circle with the station's coverage area.
    pub fn radius_km(&self) -> Option<f64> {
        self.coverage_area_km2
            .filter(|area| *area > 0.0)
            .map(|area| (area / PI).sqrt())
    }

    pub fn diameter_km(&self) -> Option<f64> {
        self.radius_km().map(|r| 2.0 * r)
    }
}
