use crate::core::housing::get_current_housing_data;
use crate::core::{DashboardError, ErrorPayload, SeriesFetcher};
use anyhow::Result;

/// Pretty JSON of the dashboard payload, or of an [`ErrorPayload`] when the
/// dashboard cannot be produced.
pub async fn render(fetcher: &dyn SeriesFetcher, lookback_months: Option<u32>) -> Result<String> {
    match get_current_housing_data(fetcher, lookback_months, &|| ()).await {
        Ok(data) => Ok(serde_json::to_string_pretty(&data)?),
        Err(e) => render_error(&e),
    }
}

pub fn render_error(err: &DashboardError) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ErrorPayload::from(err))?)
}
