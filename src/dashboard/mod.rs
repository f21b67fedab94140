//! Dashboard module
//!
//! Provides monthly totals of the cashbook and per wallet breakdowns of
//! incomes and expenses, as JSON and as an overview page.

mod aggregation;
mod cards;
mod handlers;

pub use aggregation::{DashboardSummary, get_dashboard_summary};
pub use handlers::{get_dashboard_endpoint, get_dashboard_page};
