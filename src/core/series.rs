//! Series identity, raw observations and the fetcher abstraction

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// FRED reports "no data" for a date with a single dot.
pub const MISSING_MARKER: &str = ".";

/// A single raw data point as returned by FRED.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: String,
    pub value: String,
}

impl Observation {
    pub fn new(date: &str, value: &str) -> Self {
        Observation {
            date: date.to_string(),
            value: value.to_string(),
        }
    }

    /// Numeric value, or `None` for the missing-marker, empty text and
    /// anything that does not parse to a finite number.
    pub fn parsed_value(&self) -> Option<f64> {
        let trimmed = self.value.trim();
        if trimmed.is_empty() || trimmed == MISSING_MARKER {
            return None;
        }
        trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

/// Which comparison a metric reports its change against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeBasis {
    YearOverYear,
    MonthOverMonth,
}

impl ChangeBasis {
    pub fn description(&self) -> &'static str {
        match self {
            ChangeBasis::YearOverYear => "vs last year",
            ChangeBasis::MonthOverMonth => "vs last month",
        }
    }
}

/// How a metric's current value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    Index,
    Count,
    Percent,
}

/// The five tracked Houston series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesRole {
    HomePriceIndex,
    ActiveListings,
    RentIndex,
    BuildingPermits,
    Unemployment,
}

impl SeriesRole {
    /// Stable dashboard order.
    pub const ALL: [SeriesRole; 5] = [
        SeriesRole::HomePriceIndex,
        SeriesRole::ActiveListings,
        SeriesRole::RentIndex,
        SeriesRole::BuildingPermits,
        SeriesRole::Unemployment,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            SeriesRole::HomePriceIndex => "hpi",
            SeriesRole::ActiveListings => "inventory",
            SeriesRole::RentIndex => "rent",
            SeriesRole::BuildingPermits => "permits",
            SeriesRole::Unemployment => "unemployment",
        }
    }

    /// FRED series code for the Houston-The Woodlands-Sugar Land MSA.
    pub fn series_id(&self) -> &'static str {
        match self {
            SeriesRole::HomePriceIndex => "ATNHPIUS26420Q",
            SeriesRole::ActiveListings => "ACTLISCOU26420",
            SeriesRole::RentIndex => "CUURA318SEHA",
            SeriesRole::BuildingPermits => "HOUS448BPPRIV",
            SeriesRole::Unemployment => "HOUS448URN",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SeriesRole::HomePriceIndex => "Home Price Index",
            SeriesRole::ActiveListings => "Active Listings",
            SeriesRole::RentIndex => "Rental CPI",
            SeriesRole::BuildingPermits => "Building Permits",
            SeriesRole::Unemployment => "Unemployment Rate",
        }
    }

    pub fn change_basis(&self) -> ChangeBasis {
        match self {
            SeriesRole::HomePriceIndex | SeriesRole::RentIndex => ChangeBasis::YearOverYear,
            SeriesRole::ActiveListings
            | SeriesRole::BuildingPermits
            | SeriesRole::Unemployment => ChangeBasis::MonthOverMonth,
        }
    }

    pub fn value_format(&self) -> ValueFormat {
        match self {
            SeriesRole::HomePriceIndex | SeriesRole::RentIndex => ValueFormat::Index,
            SeriesRole::ActiveListings | SeriesRole::BuildingPermits => ValueFormat::Count,
            SeriesRole::Unemployment => ValueFormat::Percent,
        }
    }

    /// Whether a falling value is good news.
    pub fn lower_is_better(&self) -> bool {
        matches!(self, SeriesRole::Unemployment)
    }
}

impl Display for SeriesRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for SeriesRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        SeriesRole::ALL
            .into_iter()
            .find(|role| role.id() == lowered)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid series: {}. Expected one of: hpi, inventory, rent, permits, unemployment",
                    s
                )
            })
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("FRED API key is not configured")]
    Configuration,
    #[error("FRED API error: {status} {status_text}")]
    Upstream { status: u16, status_text: String },
    #[error("Request error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Failed to parse FRED response for {series_id}: {source}")]
    Decode {
        series_id: String,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait SeriesFetcher: Send + Sync {
    /// Raw observations for `series_id`, optionally limited to the trailing
    /// `lookback_months` months.
    async fn fetch_series(
        &self,
        series_id: &str,
        lookback_months: Option<u32>,
    ) -> Result<Vec<Observation>, FetchError>;
}
