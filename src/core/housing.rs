//! Fans out fetches for every tracked series and assembles the dashboard payload.

use crate::core::metrics::{Metric, create_metric};
use crate::core::series::{FetchError, Observation, SeriesFetcher, SeriesRole};
use crate::core::transform::{ChartDataPoint, transform_observations};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, error, warn};

type SeriesOutcomes = HashMap<SeriesRole, Result<Vec<Observation>, FetchError>>;

/// Everything the dashboard renders. Every slot is always present; a series
/// that could not be loaded shows up as an empty chart and an "N/A" metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HousingData {
    pub metrics: [Metric; 5],
    pub hpi_data: Vec<ChartDataPoint>,
    pub inventory_data: Vec<ChartDataPoint>,
    pub rent_data: Vec<ChartDataPoint>,
    pub permits_data: Vec<ChartDataPoint>,
    pub unemployment_data: Vec<ChartDataPoint>,
}

impl HousingData {
    pub fn fallback() -> Self {
        HousingData {
            metrics: SeriesRole::ALL.map(Metric::unavailable),
            hpi_data: Vec::new(),
            inventory_data: Vec::new(),
            rent_data: Vec::new(),
            permits_data: Vec::new(),
            unemployment_data: Vec::new(),
        }
    }

    pub fn chart(&self, role: SeriesRole) -> &[ChartDataPoint] {
        match role {
            SeriesRole::HomePriceIndex => &self.hpi_data,
            SeriesRole::ActiveListings => &self.inventory_data,
            SeriesRole::RentIndex => &self.rent_data,
            SeriesRole::BuildingPermits => &self.permits_data,
            SeriesRole::Unemployment => &self.unemployment_data,
        }
    }
}

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("No fetch outcome for series {0}")]
    MissingOutcome(SeriesRole),
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(
        "FRED API key is not configured. Set FRED_API_KEY or providers.fred.api_key in the config file"
    )]
    Configuration,
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Configuration,
    Internal,
}

/// Error body handed to the presentation layer in place of a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    pub message: String,
    pub kind: ErrorKind,
}

impl From<&DashboardError> for ErrorPayload {
    fn from(err: &DashboardError) -> Self {
        let (error, kind) = match err {
            DashboardError::Configuration => ("Configuration error", ErrorKind::Configuration),
            DashboardError::Internal(_) => ("Failed to fetch housing data", ErrorKind::Internal),
        };
        ErrorPayload {
            error: error.to_string(),
            message: err.to_string(),
            kind,
        }
    }
}

async fn fetch_outcomes(
    fetcher: &dyn SeriesFetcher,
    lookback_months: Option<u32>,
    progress: &(dyn Fn() + Send + Sync),
) -> SeriesOutcomes {
    let fetches = SeriesRole::ALL.into_iter().map(|role| async move {
        let result = fetcher.fetch_series(role.series_id(), lookback_months).await;
        match &result {
            Ok(observations) => debug!(
                series = role.id(),
                count = observations.len(),
                "Series fetched"
            ),
            Err(e) => warn!(series = role.id(), error = %e, "Series fetch failed"),
        }
        progress();
        (role, result)
    });

    join_all(fetches).await.into_iter().collect()
}

fn observations_for(
    outcomes: &SeriesOutcomes,
    role: SeriesRole,
) -> Result<&[Observation], AssemblyError> {
    match outcomes.get(&role) {
        Some(Ok(observations)) => Ok(observations.as_slice()),
        Some(Err(_)) => Ok(&[]),
        None => Err(AssemblyError::MissingOutcome(role)),
    }
}

fn assemble(outcomes: &SeriesOutcomes) -> Result<HousingData, AssemblyError> {
    let hpi = observations_for(outcomes, SeriesRole::HomePriceIndex)?;
    let inventory = observations_for(outcomes, SeriesRole::ActiveListings)?;
    let rent = observations_for(outcomes, SeriesRole::RentIndex)?;
    let permits = observations_for(outcomes, SeriesRole::BuildingPermits)?;
    let unemployment = observations_for(outcomes, SeriesRole::Unemployment)?;

    Ok(HousingData {
        metrics: [
            create_metric(SeriesRole::HomePriceIndex, hpi),
            create_metric(SeriesRole::ActiveListings, inventory),
            create_metric(SeriesRole::RentIndex, rent),
            create_metric(SeriesRole::BuildingPermits, permits),
            create_metric(SeriesRole::Unemployment, unemployment),
        ],
        hpi_data: transform_observations(hpi, None),
        inventory_data: transform_observations(inventory, None),
        rent_data: transform_observations(rent, None),
        permits_data: transform_observations(permits, None),
        unemployment_data: transform_observations(unemployment, None),
    })
}

fn build_housing_data(outcomes: &SeriesOutcomes) -> HousingData {
    assemble(outcomes).unwrap_or_else(|e| {
        error!(error = %e, "Failed to assemble housing data, using fallback");
        HousingData::fallback()
    })
}

/// Fetches all tracked series concurrently and builds the payload. Individual
/// series failures never fail the whole call. `progress` runs once per settled
/// fetch.
pub async fn fetch_all_housing_data(
    fetcher: &dyn SeriesFetcher,
    lookback_months: Option<u32>,
    progress: &(dyn Fn() + Send + Sync),
) -> HousingData {
    let outcomes = fetch_outcomes(fetcher, lookback_months, progress).await;
    build_housing_data(&outcomes)
}

/// Like [`fetch_all_housing_data`], but reports a missing API key as an error
/// instead of an empty dashboard.
pub async fn get_current_housing_data(
    fetcher: &dyn SeriesFetcher,
    lookback_months: Option<u32>,
    progress: &(dyn Fn() + Send + Sync),
) -> Result<HousingData, DashboardError> {
    let outcomes = fetch_outcomes(fetcher, lookback_months, progress).await;

    if outcomes
        .values()
        .any(|result| matches!(result, Err(FetchError::Configuration)))
    {
        return Err(DashboardError::Configuration);
    }

    Ok(build_housing_data(&outcomes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metrics::ChangeType;
    use crate::providers::fred::FredClient;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockFetcher {
        data: HashMap<&'static str, Vec<Observation>>,
        // Series missing from `data` are fetched here and fail at the transport level.
        unreachable: FredClient,
    }

    impl MockFetcher {
        fn new() -> Self {
            MockFetcher {
                data: HashMap::new(),
                unreachable: FredClient::new("http://127.0.0.1:1", Some("test-key".to_string()))
                    .unwrap(),
            }
        }

        fn with_series(mut self, role: SeriesRole, pairs: &[(&str, &str)]) -> Self {
            self.data.insert(
                role.series_id(),
                pairs.iter().map(|(d, v)| Observation::new(d, v)).collect(),
            );
            self
        }
    }

    #[async_trait]
    impl SeriesFetcher for MockFetcher {
        async fn fetch_series(
            &self,
            series_id: &str,
            lookback_months: Option<u32>,
        ) -> Result<Vec<Observation>, FetchError> {
            match self.data.get(series_id) {
                Some(observations) => Ok(observations.clone()),
                None => {
                    self.unreachable
                        .fetch_series(series_id, lookback_months)
                        .await
                }
            }
        }
    }

    struct UnconfiguredFetcher;

    #[async_trait]
    impl SeriesFetcher for UnconfiguredFetcher {
        async fn fetch_series(
            &self,
            _series_id: &str,
            _lookback_months: Option<u32>,
        ) -> Result<Vec<Observation>, FetchError> {
            Err(FetchError::Configuration)
        }
    }

    fn four_of_five() -> MockFetcher {
        MockFetcher::new()
            .with_series(
                SeriesRole::HomePriceIndex,
                &[("2023-01-01", "300.0"), ("2024-01-01", "315.0")],
            )
            .with_series(
                SeriesRole::ActiveListings,
                &[("2024-01-01", "13000"), ("2024-02-01", "12847")],
            )
            .with_series(
                SeriesRole::RentIndex,
                &[("2023-02-01", "280.0"), ("2024-02-01", ".")],
            )
            .with_series(
                SeriesRole::Unemployment,
                &[("2024-01-01", "4.1"), ("2024-02-01", "3.8")],
            )
    }

    #[tokio::test]
    async fn test_one_failed_series_keeps_full_shape() {
        let fetcher = four_of_five();
        let data = fetch_all_housing_data(&fetcher, None, &|| ()).await;

        let ids: Vec<&str> = data.metrics.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["hpi", "inventory", "rent", "permits", "unemployment"]);

        // Building permits were unreachable.
        assert!(data.permits_data.is_empty());
        assert_eq!(data.metrics[3], Metric::unavailable(SeriesRole::BuildingPermits));

        assert_eq!(data.hpi_data.len(), 2);
        assert_eq!(data.metrics[0].value, "315.0");
        assert_eq!(data.metrics[0].change, "+5.0%");
        assert_eq!(data.metrics[0].change_type, ChangeType::Positive);

        assert_eq!(data.inventory_data.len(), 2);
        assert_eq!(data.metrics[1].value, "12,847");
        assert_eq!(data.metrics[1].change_type, ChangeType::Negative);

        assert_eq!(data.rent_data.len(), 1);
        assert_eq!(data.metrics[2].value, "280.0");
        assert_eq!(data.metrics[2].change_type, ChangeType::Neutral);

        assert_eq!(data.unemployment_data[1].date, "Feb 2024");
        assert_eq!(data.metrics[4].change_type, ChangeType::Positive);
    }

    #[tokio::test]
    async fn test_all_series_failed_yields_fallback() {
        let fetcher = MockFetcher::new();
        let data = fetch_all_housing_data(&fetcher, Some(12), &|| ()).await;
        assert_eq!(data, HousingData::fallback());
    }

    #[tokio::test]
    async fn test_progress_runs_once_per_series() {
        let fetcher = four_of_five();
        let calls = AtomicUsize::new(0);
        fetch_all_housing_data(&fetcher, None, &|| {
            calls.fetch_add(1, Ordering::SeqCst);
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_missing_api_key_is_reported() {
        let result = get_current_housing_data(&UnconfiguredFetcher, None, &|| ()).await;
        assert!(matches!(result, Err(DashboardError::Configuration)));

        // The lenient entry point still returns a well-formed payload.
        let data = fetch_all_housing_data(&UnconfiguredFetcher, None, &|| ()).await;
        assert_eq!(data, HousingData::fallback());
    }

    #[tokio::test]
    async fn test_get_current_housing_data_tolerates_upstream_failures() {
        let fetcher = four_of_five();
        let data = get_current_housing_data(&fetcher, None, &|| ())
            .await
            .unwrap();
        assert!(data.permits_data.is_empty());
        assert_eq!(data.unemployment_data.len(), 2);
    }

    #[test]
    fn test_missing_outcome_falls_back() {
        let mut outcomes = SeriesOutcomes::new();
        outcomes.insert(
            SeriesRole::HomePriceIndex,
            Ok(vec![Observation::new("2024-01-01", "300.0")]),
        );

        assert!(matches!(
            assemble(&outcomes),
            Err(AssemblyError::MissingOutcome(SeriesRole::ActiveListings))
        ));
        assert_eq!(build_housing_data(&outcomes), HousingData::fallback());
    }

    #[test]
    fn test_payload_json_shape() {
        let json = serde_json::to_value(HousingData::fallback()).unwrap();
        for key in [
            "hpiData",
            "inventoryData",
            "rentData",
            "permitsData",
            "unemploymentData",
        ] {
            assert_eq!(json[key], serde_json::json!([]));
        }
        assert_eq!(json["metrics"].as_array().unwrap().len(), 5);
        assert_eq!(json["metrics"][4]["value"], "N/A");
    }

    #[test]
    fn test_error_payload_distinguishes_configuration() {
        let payload = ErrorPayload::from(&DashboardError::Configuration);
        assert_eq!(payload.kind, ErrorKind::Configuration);
        assert!(payload.message.contains("FRED_API_KEY"));

        let payload = ErrorPayload::from(&DashboardError::Internal("boom".to_string()));
        assert_eq!(payload.kind, ErrorKind::Internal);
        assert_eq!(payload.message, "boom");
        assert_eq!(
            serde_json::to_value(&payload).unwrap()["kind"],
            "internal"
        );
    }
}
