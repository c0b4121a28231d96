use super::ui;
use crate::core::housing::get_current_housing_data;
use crate::core::metrics::format_value;
use crate::core::{DashboardError, HousingData, SeriesFetcher, SeriesRole};
use anyhow::Result;
use comfy_table::Cell;

impl HousingData {
    pub fn display_metrics_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Indicator"),
            ui::header_cell("Value"),
            ui::header_cell("Change"),
            ui::header_cell("Compared"),
        ]);

        for metric in &self.metrics {
            table.add_row(vec![
                Cell::new(&metric.title),
                ui::value_cell(&metric.value),
                ui::change_cell(&metric.change, metric.change_type),
                Cell::new(ui::style_text(&metric.description, ui::StyleType::Subtle)),
            ]);
        }

        table.to_string()
    }

    pub fn display_series_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Series"),
            ui::header_cell("FRED Code"),
            ui::header_cell("Points"),
            ui::header_cell("From"),
            ui::header_cell("To"),
            ui::header_cell("Latest"),
        ]);

        for role in SeriesRole::ALL {
            let points = self.chart(role);
            let first = points.first().map_or("N/A", |p| p.date.as_str());
            let last = points.last().map_or("N/A", |p| p.date.as_str());
            let latest = format_value(role, points.last().map(|p| p.value));

            table.add_row(vec![
                Cell::new(role.title()),
                Cell::new(role.series_id()),
                ui::value_cell(&points.len().to_string()),
                Cell::new(first),
                Cell::new(last),
                ui::value_cell(&latest),
            ]);
        }

        table.to_string()
    }
}

fn display_error(err: &DashboardError) -> String {
    let mut output = format!(
        "{}\n",
        ui::style_text(&format!("Error: {err}"), ui::StyleType::Error)
    );
    if let DashboardError::Configuration = err {
        output.push_str(&ui::style_text(
            "Request a free API key at https://fred.stlouisfed.org/docs/api/api_key.html\n",
            ui::StyleType::Subtle,
        ));
    }
    output.push_str(&ui::style_text(
        "Run `hhd dashboard` again to retry.",
        ui::StyleType::Subtle,
    ));
    output
}

pub async fn run(fetcher: &dyn SeriesFetcher, lookback_months: Option<u32>) -> Result<()> {
    let pb = ui::new_progress_bar(SeriesRole::ALL.len() as u64);
    pb.set_message("Fetching FRED series...");

    let result = get_current_housing_data(fetcher, lookback_months, &|| pb.inc(1)).await;
    pb.finish_and_clear();

    match result {
        Ok(data) => {
            println!(
                "{}\n",
                ui::style_text("Houston Housing Market", ui::StyleType::Title)
            );
            println!("{}", data.display_metrics_table());
            ui::print_separator();
            println!("{}", data.display_series_table());
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", display_error(&e));
            Err(e.into())
        }
    }
}
