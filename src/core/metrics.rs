//! Summarizes a series into a single dashboard metric: the latest value and
//! its period-over-period change.
//!
//! Changes are classified from their numeric value, not their formatted text.

use crate::core::series::{ChangeBasis, Observation, SeriesRole, ValueFormat};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// How far a year-ago observation may sit from the exact year-ago date.
const YEAR_AGO_TOLERANCE_DAYS: i64 = 45;

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub id: String,
    pub title: String,
    pub value: String,
    pub change: String,
    pub change_type: ChangeType,
    pub description: String,
}

impl Metric {
    /// Metric shown when nothing is known about a series.
    pub fn unavailable(role: SeriesRole) -> Self {
        Metric {
            id: role.id().to_string(),
            title: role.title().to_string(),
            value: NOT_AVAILABLE.to_string(),
            change: format_change(None),
            change_type: ChangeType::Neutral,
            description: role.change_basis().description().to_string(),
        }
    }
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn latest_valid(observations: &[Observation]) -> Option<(&Observation, f64)> {
    observations
        .iter()
        .rev()
        .find_map(|obs| obs.parsed_value().map(|v| (obs, v)))
}

/// Most recent non-missing value.
pub fn latest_valid_value(observations: &[Observation]) -> Option<f64> {
    latest_valid(observations).map(|(_, v)| v)
}

/// Signed percentage change, or `None` when the prior value is zero.
pub fn percentage_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}

/// Formats a change with one decimal and an explicit sign. `None` reads as no change.
pub fn format_change(change: Option<f64>) -> String {
    // -0.0 would otherwise print as "+-0.0%".
    match change.map(|c| if c == 0.0 { 0.0 } else { c }) {
        Some(c) if c >= 0.0 => format!("+{c:.1}%"),
        Some(c) => format!("{c:.1}%"),
        None => "+0.0%".to_string(),
    }
}

pub fn calculate_percentage_change(previous: f64, current: f64) -> String {
    format_change(percentage_change(previous, current))
}

/// Change between the latest value and the value closest to one year earlier.
/// Equidistant candidates resolve to the earlier date.
pub fn year_over_year_change(observations: &[Observation]) -> Option<f64> {
    let (latest_obs, latest) = latest_valid(observations)?;
    let target = parse_date(&latest_obs.date)?.checked_sub_months(Months::new(12))?;

    let (_, year_ago) = observations
        .iter()
        .filter_map(|obs| {
            let date = parse_date(&obs.date)?;
            let value = obs.parsed_value()?;
            let distance = (date - target).num_days().abs();
            (distance <= YEAR_AGO_TOLERANCE_DAYS).then_some(((distance, date), value))
        })
        .min_by_key(|(key, _)| *key)?;

    percentage_change(year_ago, latest)
}

/// Change between the two most recent valid values.
pub fn month_over_month_change(observations: &[Observation]) -> Option<f64> {
    let mut recent = observations.iter().rev().filter_map(Observation::parsed_value);
    let current = recent.next()?;
    let previous = recent.next()?;
    percentage_change(previous, current)
}

/// Maps the sign of a change to good/bad news for `role`.
pub fn classify_change(role: SeriesRole, change: Option<f64>) -> ChangeType {
    match change {
        Some(c) if c > 0.0 => {
            if role.lower_is_better() {
                ChangeType::Negative
            } else {
                ChangeType::Positive
            }
        }
        Some(c) if c < 0.0 => {
            if role.lower_is_better() {
                ChangeType::Positive
            } else {
                ChangeType::Negative
            }
        }
        _ => ChangeType::Neutral,
    }
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if n < 0 {
        grouped.insert(0, '-');
    }
    grouped
}

pub fn format_value(role: SeriesRole, value: Option<f64>) -> String {
    let Some(v) = value else {
        return NOT_AVAILABLE.to_string();
    };
    match role.value_format() {
        ValueFormat::Index => format!("{v:.1}"),
        ValueFormat::Count => group_thousands(v.round() as i64),
        ValueFormat::Percent => format!("{v:.1}%"),
    }
}

pub fn create_metric(role: SeriesRole, observations: &[Observation]) -> Metric {
    let change = match role.change_basis() {
        ChangeBasis::YearOverYear => year_over_year_change(observations),
        ChangeBasis::MonthOverMonth => month_over_month_change(observations),
    };

    Metric {
        id: role.id().to_string(),
        title: role.title().to_string(),
        value: format_value(role, latest_valid_value(observations)),
        change: format_change(change),
        change_type: classify_change(role, change),
        description: role.change_basis().description().to_string(),
    }
}
