//! Geographic zones and the per-zone station metrics used in coverage
//! planning.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::station::StationRecord;

/// Multiplier applied to the station estimate when most stations with a
/// known handover status fall outside their handover band.
pub const HANDOVER_PENALTY: f64 = 1.4;

/// Stations in a frequency cluster.
pub const CLUSTER_SIZE: usize = 3;

/// Construction difficulty of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    /// Dense urban development.
    Hard,
    Medium,
    /// Rural.
    Light,
}

impl BuildType {
    pub const ALL: [BuildType; 3] = [BuildType::Hard, BuildType::Medium, BuildType::Light];

    /// Development coefficient `K` in `L = K * (R0 / R)^2`.
    pub fn coefficient(self) -> f64 {
        match self {
            BuildType::Hard => 1.21,
            BuildType::Medium => 0.9,
            BuildType::Light => 0.47,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BuildType::Hard => "плотная",
            BuildType::Medium => "средняя",
            BuildType::Light => "сельская",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuildType::Hard => "hard",
            BuildType::Medium => "medium",
            BuildType::Light => "light",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = Error;

    /// Accepts the English name or the Russian label, ignoring case.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        BuildType::ALL
            .into_iter()
            .find(|bt| bt.as_str() == wanted || bt.label() == wanted)
            .ok_or_else(|| Error::validation(format!("unknown build type '{}'", s.trim())))
    }
}

/// Result of [`Zone::cell_estimate`]: `estimate = average_cells / cluster_c`,
/// times [`HANDOVER_PENALTY`] when it applies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellEstimate {
    pub average_cells: f64,
    pub cluster_c: f64,
    pub handover_penalty_applied: bool,
    pub estimate: f64,
}

/// A named area and the base stations assigned to it.
///
/// The zone owns its station list. A station that belongs to several zones
/// is cloned into each of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zone {
    name: String,
    area_km2: f64,
    build_type: BuildType,
    stations: Vec<StationRecord>,
}

impl Zone {
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the name is blank or the area is not
    /// a finite positive number.
    pub fn new(
        name: impl Into<String>,
        area_km2: f64,
        build_type: BuildType,
        stations: Vec<StationRecord>,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::validation("zone name must not be empty"));
        }
        if !area_km2.is_finite() || area_km2 <= 0.0 {
            return Err(Error::validation(format!(
                "zone '{name}': area must be a positive number of km², got {area_km2}"
            )));
        }

        Ok(Self {
            name,
            area_km2,
            build_type,
            stations,
        })
    }

    /// Builds a zone from the stations that match `belongs`.
    pub fn select<F>(
        name: impl Into<String>,
        area_km2: f64,
        build_type: BuildType,
        stations: &[StationRecord],
        belongs: F,
    ) -> Result<Self>
    where
        F: Fn(&StationRecord) -> bool,
    {
        let members = stations.iter().filter(|s| belongs(s)).cloned().collect();
        Self::new(name, area_km2, build_type, members)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn area_km2(&self) -> f64 {
        self.area_km2
    }

    pub fn build_type(&self) -> BuildType {
        self.build_type
    }

    pub fn stations(&self) -> &[StationRecord] {
        &self.stations
    }

    pub fn n_stations(&self) -> usize {
        self.stations.len()
    }

    /// Stations per km². The constructor guarantees a positive area.
    pub fn station_density(&self) -> f64 {
        self.n_stations() as f64 / self.area_km2
    }

    pub fn build_coeff(&self) -> f64 {
        self.build_type.coefficient()
    }

    /// Radius of a circle with the zone's area: `sqrt(s / π)`.
    pub fn r0_km(&self) -> f64 {
        (self.area_km2 / PI).sqrt()
    }

    /// Number of cells `L = K * (R0 / R)^2` needed if every cell had this
    /// station's coverage radius `R`. `None` when the station has no coverage
    /// area.
    pub fn cells_for_station(&self, station: &StationRecord) -> Option<f64> {
        let r = station.radius_km()?;
        Some(self.build_coeff() * (self.r0_km() / r).powi(2))
    }

    /// Arithmetic mean of [`Zone::cells_for_station`] over stations that
    /// have a coverage area.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when no station in the zone has one.
    pub fn average_cells(&self) -> Result<f64> {
        let values: Vec<f64> = self
            .stations
            .iter()
            .filter_map(|s| self.cells_for_station(s))
            .collect();

        if values.is_empty() {
            return Err(Error::validation(format!(
                "zone '{}' has no base stations with a coverage area",
                self.name
            )));
        }
        Ok(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Handover check counts as `(ok, failing, unknown)`.
    pub fn handover_counts(&self) -> (usize, usize, usize) {
        self.stations
            .iter()
            .fold((0, 0, 0), |(ok, bad, unknown), s| match s.is_handover_ok() {
                Some(true) => (ok + 1, bad, unknown),
                Some(false) => (ok, bad + 1, unknown),
                None => (ok, bad, unknown + 1),
            })
    }

    /// Picks the cluster: the widest stations whose frequencies all differ,
    /// widest first. Stations without a coverage area or a frequency cannot
    /// take part. Among equal diameters the earlier station wins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the zone has fewer than three
    /// stations, or fewer than three eligible ones with distinct frequencies.
    pub fn choose_cluster_stations(&self) -> Result<[&StationRecord; CLUSTER_SIZE]> {
        if self.stations.len() < CLUSTER_SIZE {
            return Err(Error::validation(format!(
                "zone '{}' needs at least {CLUSTER_SIZE} base stations to form a cluster, has {}",
                self.name,
                self.stations.len()
            )));
        }

        let mut candidates: Vec<(&StationRecord, f64, u64)> = self
            .stations
            .iter()
            .filter_map(|s| Some((s, s.diameter_km()?, s.frequency_hz()?)))
            .collect();
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut used_frequencies = HashSet::new();
        let chosen: Vec<&StationRecord> = candidates
            .into_iter()
            .filter(|(_, _, frequency)| used_frequencies.insert(*frequency))
            .map(|(station, _, _)| station)
            .take(CLUSTER_SIZE)
            .collect();

        <[&StationRecord; CLUSTER_SIZE]>::try_from(chosen).map_err(|_| {
            Error::validation(format!(
                "zone '{}' has fewer than {CLUSTER_SIZE} base stations with distinct frequencies",
                self.name
            ))
        })
    }

    /// Cluster term `C = D1^(5/2) + D2^(3/2) + D3^(1/2)` over station
    /// diameters in descending order. Uses `cluster` when given, otherwise
    /// [`Zone::choose_cluster_stations`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when `cluster` does not hold exactly
    /// three stations or one of them has no coverage area, and the errors of
    /// [`Zone::choose_cluster_stations`] otherwise.
    pub fn cluster_c(&self, cluster: Option<&[StationRecord]>) -> Result<f64> {
        let members: Vec<&StationRecord> = match cluster {
            Some(stations) => stations.iter().collect(),
            None => self.choose_cluster_stations()?.to_vec(),
        };
        if members.len() != CLUSTER_SIZE {
            return Err(Error::validation(format!(
                "a cluster has exactly {CLUSTER_SIZE} stations, got {}",
                members.len()
            )));
        }

        let mut diameters = members
            .iter()
            .map(|s| {
                s.diameter_km().ok_or_else(|| {
                    Error::validation(format!("station '{}' has no coverage area", s.id()))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        diameters.sort_by(|a, b| b.total_cmp(a));

        Ok(diameters[0].powf(2.5) + diameters[1].powf(1.5) + diameters[2].sqrt())
    }

    /// Estimated number of base stations `n = L / C`, raised by
    /// [`HANDOVER_PENALTY`] when more than half of the stations with a known
    /// handover status fail the check.
    ///
    /// # Errors
    ///
    /// Same as [`Zone::average_cells`] and [`Zone::cluster_c`].
    pub fn cell_estimate(&self, cluster: Option<&[StationRecord]>) -> Result<CellEstimate> {
        let average_cells = self.average_cells()?;
        let cluster_c = self.cluster_c(cluster)?;
        let (ok, bad, _) = self.handover_counts();
        let handover_penalty_applied = bad > ok;

        let mut estimate = average_cells / cluster_c;
        if handover_penalty_applied {
            estimate *= HANDOVER_PENALTY;
        }

        Ok(CellEstimate {
            average_cells,
            cluster_c,
            handover_penalty_applied,
            estimate,
        })
    }
}
