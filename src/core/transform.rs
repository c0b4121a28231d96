//! Turns raw observations into display-ready chart points.

use crate::core::series::Observation;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataPoint {
    pub date: String,
    pub value: f64,
}

/// Formats an ISO date as "Mon YYYY". Dates that fail to parse keep their raw text.
pub fn month_label(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}

/// Drops missing observations and keeps at most the `limit` most recent points,
/// in chronological order.
pub fn transform_observations(
    observations: &[Observation],
    limit: Option<usize>,
) -> Vec<ChartDataPoint> {
    let points: Vec<ChartDataPoint> = observations
        .iter()
        .filter_map(|obs| {
            obs.parsed_value().map(|value| ChartDataPoint {
                date: month_label(&obs.date),
                value,
            })
        })
        .collect();

    match limit {
        Some(limit) if points.len() > limit => points[points.len() - limit..].to_vec(),
        _ => points,
    }
}
