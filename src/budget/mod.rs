//! Spending limits per expense category and period, and how much of each
//! has been spent.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod list;
mod progress;

pub use create::create_budget_endpoint;
pub use db::{
    create_budget, create_budget_table, delete_budget, get_active_budgets, get_budget,
    get_budgets_with_category, update_budget,
};
pub use delete::delete_budget_endpoint;
pub use domain::{Budget, BudgetForm, BudgetId, BudgetPeriod, BudgetWithCategory, NewBudget};
pub use edit::{get_edit_budget_page, update_budget_endpoint};
pub use list::get_budgets_page;
pub use progress::{BudgetProgress, BudgetStatus, budget_progress, progress_bar, status_label};
