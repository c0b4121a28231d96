pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::config::{API_KEY_ENV, AppConfig};
use crate::core::{DashboardError, SeriesRole};
use crate::providers::caching::CachingSeriesFetcher;
use crate::providers::fred::FredClient;
use anyhow::Result;
use std::time::Duration;
use tracing::{debug, info};

pub enum AppCommand {
    Dashboard,
    Series {
        role: SeriesRole,
        limit: Option<usize>,
    },
    Json,
}

/// FRED client wrapped in the in-process response cache.
pub fn build_fetcher(
    config: &AppConfig,
    api_key: Option<String>,
) -> Result<CachingSeriesFetcher<FredClient>> {
    let client = FredClient::new(&config.providers.fred.base_url, api_key)?;
    Ok(CachingSeriesFetcher::new(
        client,
        Duration::from_secs(config.cache_ttl_secs),
    ))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Houston housing dashboard starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        base_url = %config.providers.fred.base_url,
        lookback_months = ?config.lookback_months,
        cache_ttl_secs = config.cache_ttl_secs,
        "Loaded config"
    );

    let api_key = config.resolve_api_key(std::env::var(API_KEY_ENV).ok());
    let lookback_months = config.lookback_months;

    match command {
        AppCommand::Dashboard => {
            let fetcher = build_fetcher(&config, api_key)?;
            cli::dashboard::run(&fetcher, lookback_months).await
        }
        AppCommand::Series { role, limit } => {
            let fetcher = build_fetcher(&config, api_key)?;
            cli::series::run(&fetcher, role, lookback_months, limit).await
        }
        AppCommand::Json => {
            let output = match build_fetcher(&config, api_key) {
                Ok(fetcher) => cli::json::render(&fetcher, lookback_months).await?,
                Err(e) => cli::json::render_error(&DashboardError::Internal(format!("{e:#}")))?,
            };
            println!("{output}");
            Ok(())
        }
    }
}
