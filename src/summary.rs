use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::zone::{BuildType, Zone};

/// Flat per-zone report row, written to CSV or JSON.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneSummary {
    pub timestamp: DateTime<Utc>,
    pub zone: String,
    pub build_type: BuildType,
    pub area_km2: f64,
    pub n_stations: usize,
    pub station_density: f64,

    // coverage planning
    pub r0_km: f64,
    pub average_cells: Option<f64>,
    pub cluster_c: Option<f64>,
    pub cell_estimate: Option<f64>,
    pub handover_penalty_applied: bool,

    // handover check
    pub handover_ok: usize,
    pub handover_failing: usize,
    pub handover_unknown: usize,
}

impl ZoneSummary {
    pub fn from_zone(zone: &Zone) -> Self {
        let (handover_ok, handover_failing, handover_unknown) = zone.handover_counts();
        let estimate = zone.cell_estimate(None).ok();

        ZoneSummary {
            timestamp: Utc::now(),
            zone: zone.name().to_string(),
            build_type: zone.build_type(),
            area_km2: zone.area_km2(),
            n_stations: zone.n_stations(),
            station_density: zone.station_density(),
            r0_km: zone.r0_km(),
            average_cells: zone.average_cells().ok(),
            cluster_c: estimate.map(|e| e.cluster_c),
            cell_estimate: estimate.map(|e| e.estimate),
            handover_penalty_applied: estimate.is_some_and(|e| e.handover_penalty_applied),
            handover_ok,
            handover_failing,
            handover_unknown,
        }
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    /// Share of stations with a known handover status that pass the check.
    pub fn handover_ok_pct(&self) -> f64 {
        Self::pct(self.handover_ok, self.handover_ok + self.handover_failing)
    }
}
