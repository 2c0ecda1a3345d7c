//! The dashboard: totals, monthly and per-category charts, recent transactions
//! and the progress of active budgets.

mod aggregation;
mod cards;
mod handlers;
mod tables;
mod transaction;

pub use handlers::get_dashboard_page;
