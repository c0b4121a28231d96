pub mod dashboard;
pub mod json;
pub mod series;
pub mod setup;
pub mod ui;
