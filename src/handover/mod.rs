//! Measured handover averages from the operator's monitoring API.
//!
//! [`HandoverProvider`] is the seam the rest of the crate depends on;
//! [`ApiHandoverProvider`] implements it over HTTP.

mod api;

pub use api::{ApiHandoverProvider, DEFAULT_BASE_URL};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::station::StationRecord;

/// Source of a station's measured average handover value.
#[async_trait::async_trait]
pub trait HandoverProvider: Send + Sync {
    /// `Ok(None)` when the provider knows nothing about the station.
    async fn handover_avg(&self, station_id: &str) -> Result<Option<f64>>;
}

/// Fills `handover_avg` on every station, one request per station, in order.
///
/// When a lookup fails and `fallback` is set, the fallback value is used and
/// the failure is logged; without a fallback the first failure is returned.
#[tracing::instrument(skip_all, fields(stations = stations.len(), ?fallback))]
pub async fn enrich<P>(
    provider: &P,
    stations: Vec<StationRecord>,
    fallback: Option<f64>,
) -> Result<Vec<StationRecord>>
where
    P: HandoverProvider + ?Sized,
{
    let mut enriched = Vec::with_capacity(stations.len());
    let mut fallbacks = 0usize;

    for station in stations {
        let avg = match provider.handover_avg(station.id()).await {
            Ok(avg) => {
                debug!(station_id = station.id(), ?avg, "Handover average fetched");
                avg
            }
            Err(e) => match fallback {
                Some(value) => {
                    warn!(station_id = station.id(), error = %e, fallback = value, "Handover lookup failed, using fallback");
                    fallbacks += 1;
                    Some(value)
                }
                None => return Err(e),
            },
        };
        enriched.push(station.with_handover_avg(avg));
    }

    info!(stations = enriched.len(), fallbacks, "Handover enrichment complete");
    Ok(enriched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;

    /// Answers from a fixed table; ids missing from the table fail.
    struct TableProvider(HashMap<&'static str, Option<f64>>);

    #[async_trait::async_trait]
    impl HandoverProvider for TableProvider {
        async fn handover_avg(&self, station_id: &str) -> Result<Option<f64>> {
            self.0
                .get(station_id)
                .copied()
                .ok_or_else(|| Error::InvalidResponse {
                    url: format!("table://{station_id}"),
                    reason: "no entry".to_string(),
                })
        }
    }

    fn stations(ids: &[&str]) -> Vec<StationRecord> {
        ids.iter()
            .map(|id| StationRecord::new(*id, 55.0, 37.0).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_enrich_sets_values_in_order() {
        let provider = TableProvider(HashMap::from([("1", Some(15.0)), ("2", None)]));

        let result = enrich(&provider, stations(&["1", "2"]), None).await.unwrap();

        assert_eq!(result[0].id(), "1");
        assert_eq!(result[0].handover_avg(), Some(15.0));
        assert_eq!(result[1].handover_avg(), None);
    }

    #[tokio::test]
    async fn test_enrich_uses_fallback_on_failure() {
        let provider = TableProvider(HashMap::from([("1", Some(12.5))]));

        let result = enrich(&provider, stations(&["1", "9"]), Some(15.0))
            .await
            .unwrap();

        assert_eq!(result[0].handover_avg(), Some(12.5));
        assert_eq!(result[1].handover_avg(), Some(15.0));
    }

    #[tokio::test]
    async fn test_enrich_propagates_without_fallback() {
        let provider = TableProvider(HashMap::new());

        let result = enrich(&provider, stations(&["1"]), None).await;

        assert!(matches!(result, Err(Error::InvalidResponse { .. })));
    }
}
