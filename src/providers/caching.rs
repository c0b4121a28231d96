use crate::core::cache::Cache;
use crate::core::series::{FetchError, Observation, SeriesFetcher};
use crate::store::memory::MemoryCache;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

type CacheKey = (String, Option<u32>);

/// Reuses successful series responses for `ttl`. Failures always go back to
/// the inner fetcher.
pub struct CachingSeriesFetcher<T: SeriesFetcher> {
    inner: T,
    cache: MemoryCache<CacheKey, Vec<Observation>>,
    ttl: Duration,
}

impl<T: SeriesFetcher> CachingSeriesFetcher<T> {
    pub fn new(inner: T, ttl: Duration) -> Self {
        Self {
            inner,
            cache: MemoryCache::new(),
            ttl,
        }
    }
}

#[async_trait]
impl<T: SeriesFetcher> SeriesFetcher for CachingSeriesFetcher<T> {
    async fn fetch_series(
        &self,
        series_id: &str,
        lookback_months: Option<u32>,
    ) -> Result<Vec<Observation>, FetchError> {
        let key = (series_id.to_string(), lookback_months);
        if let Some(cached) = self.cache.get(&key).await {
            debug!("Cache hit for series: {}", series_id);
            return Ok(cached);
        }

        debug!("Cache miss for series: {}", series_id);
        let observations = self.inner.fetch_series(series_id, lookback_months).await?;
        self.cache
            .put(key, observations.clone(), Some(self.ttl))
            .await;
        Ok(observations)
    }
}
