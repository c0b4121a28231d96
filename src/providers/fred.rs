use crate::core::series::{FetchError, Observation, SeriesFetcher};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Months, NaiveDate, Utc};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, instrument};

pub const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org";

const OBSERVATIONS_PATH: &str = "fred/series/observations";

/// Start and end dates covering the trailing `months` months up to `today`.
pub fn observation_window(today: NaiveDate, months: u32) -> (NaiveDate, NaiveDate) {
    let start = today
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN);
    (start, today)
}

pub struct FredClient {
    endpoint: Url,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl FredClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let endpoint = Url::parse(&format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            OBSERVATIONS_PATH
        ))
        .with_context(|| format!("Invalid FRED base url: {base_url}"))?;

        let client = reqwest::Client::builder()
            .user_agent("houston-housing/0.1")
            .build()?;

        Ok(FredClient {
            endpoint,
            api_key,
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

#[async_trait]
impl SeriesFetcher for FredClient {
    #[instrument(
        name = "FredSeriesFetch",
        skip(self),
        fields(series_id = %series_id)
    )]
    async fn fetch_series(
        &self,
        series_id: &str,
        lookback_months: Option<u32>,
    ) -> Result<Vec<Observation>, FetchError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(FetchError::Configuration)?;

        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("series_id", series_id)
                .append_pair("api_key", api_key)
                .append_pair("file_type", "json")
                .append_pair("sort_order", "asc")
                .append_pair("units", "lin");

            if let Some(months) = lookback_months {
                let (start, end) = observation_window(Utc::now().date_naive(), months);
                query
                    .append_pair("observation_start", &start.format("%Y-%m-%d").to_string())
                    .append_pair("observation_end", &end.format("%Y-%m-%d").to_string());
            }
        }

        debug!(?lookback_months, "Requesting observations from FRED");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let text = response.text().await?;
        let body: ObservationsResponse =
            serde_json::from_str(&text).map_err(|source| FetchError::Decode {
                series_id: series_id.to_string(),
                source,
            })?;

        debug!(
            count = body.observations.len(),
            "Received observations from FRED"
        );
        Ok(body.observations)
    }
}
