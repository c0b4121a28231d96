//! Core business logic abstractions

pub mod cache;
pub mod config;
pub mod housing;
pub mod log;
pub mod metrics;
pub mod series;
pub mod transform;

// Re-export main types for cleaner imports
pub use housing::{DashboardError, ErrorPayload, HousingData};
pub use metrics::{ChangeType, Metric};
pub use series::{FetchError, Observation, SeriesFetcher, SeriesRole};
pub use transform::ChartDataPoint;
