//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/categories/{category_id}', use [format_endpoint].

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for listing and adding income.
pub const INCOME_VIEW: &str = "/income";
/// The page for editing an income record.
pub const EDIT_INCOME_VIEW: &str = "/income/{record_id}/edit";
/// The page for listing and adding expenses.
pub const EXPENSES_VIEW: &str = "/expenses";
/// The page for editing an expense record.
pub const EDIT_EXPENSE_VIEW: &str = "/expenses/{record_id}/edit";
/// The page for listing and adding categories.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The page for editing a category.
pub const EDIT_CATEGORY_VIEW: &str = "/categories/{category_id}/edit";
/// The page for listing and adding budgets.
pub const BUDGETS_VIEW: &str = "/budgets";
/// The page for editing a budget.
pub const EDIT_BUDGET_VIEW: &str = "/budgets/{budget_id}/edit";
/// The page for updating the user's profile and password.
pub const SETTINGS_VIEW: &str = "/settings";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/log_out";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route to register a new user.
pub const USERS: &str = "/api/users";
/// The route to update the current user's profile.
pub const SETTINGS_API: &str = "/api/settings";
/// The route to create an income record.
pub const POST_INCOME: &str = "/api/income";
/// The route to update or delete an income record.
pub const INCOME_RECORD: &str = "/api/income/{record_id}";
/// The route to create an expense record.
pub const POST_EXPENSE: &str = "/api/expenses";
/// The route to update or delete an expense record.
pub const EXPENSE_RECORD: &str = "/api/expenses/{record_id}";
/// The route to create a category.
pub const POST_CATEGORY: &str = "/api/categories";
/// The route to update or delete a category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route to create a budget.
pub const POST_BUDGET: &str = "/api/budgets";
/// The route to update or delete a budget.
pub const BUDGET: &str = "/api/budgets/{budget_id}";

/// Replace the first `{parameter}` in `endpoint_path` with `id`.
///
/// For example, `format_endpoint("/budgets/{budget_id}/edit", 3)` gives
/// `"/budgets/3/edit"`. Paths without a parameter are returned unchanged.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let end = endpoint_path[start..]
        .find('}')
        .map(|offset| start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!("{}{id}{}", &endpoint_path[..start], &endpoint_path[end..])
}
