//! Dashboard module providing an overview of the user's finances.
//!
//! Contains the reporting period selection, the pure transaction bucketing
//! pipeline behind the income/expense chart, summary cards, ECharts chart
//! generation, and the dashboard route handler.

mod buckets;
mod cards;
mod charts;
mod handlers;
mod period;

pub use handlers::get_dashboard_page;
