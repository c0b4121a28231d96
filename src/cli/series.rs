use super::ui;
use crate::core::metrics::{Metric, create_metric, format_value};
use crate::core::transform::{ChartDataPoint, transform_observations};
use crate::core::{SeriesFetcher, SeriesRole};
use anyhow::{Context, Result};
use comfy_table::Cell;

fn display_series(role: SeriesRole, metric: &Metric, points: &[ChartDataPoint]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Date"), ui::header_cell("Value")]);

    for point in points {
        table.add_row(vec![
            Cell::new(&point.date),
            ui::value_cell(&format_value(role, Some(point.value))),
        ]);
    }

    format!(
        "{} ({})\n\nLatest: {} {} {}\n\n{}",
        ui::style_text(role.title(), ui::StyleType::Title),
        role.series_id(),
        metric.value,
        metric.change,
        ui::style_text(&metric.description, ui::StyleType::Subtle),
        table
    )
}

pub async fn run(
    fetcher: &dyn SeriesFetcher,
    role: SeriesRole,
    lookback_months: Option<u32>,
    limit: Option<usize>,
) -> Result<()> {
    let observations = fetcher
        .fetch_series(role.series_id(), lookback_months)
        .await
        .with_context(|| format!("Failed to fetch {} ({})", role.title(), role.series_id()))?;

    let points = transform_observations(&observations, limit);
    let metric = create_metric(role, &observations);

    println!("{}", display_series(role, &metric, &points));
    Ok(())
}
