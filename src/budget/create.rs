//! Endpoint for adding budgets.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    budget::{
        BudgetForm,
        db::create_budget,
        form::{BudgetFormTarget, budget_form, is_form_error, parse_budget_form},
    },
    category::{CategoryKind, get_categories_by_kind},
    endpoints,
};

/// The state needed to create a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Add a budget, redirecting to the budgets page on success.
pub async fn create_budget_endpoint(
    State(state): State<CreateBudgetState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let new_budget = match parse_budget_form(user_id, &form, None, &connection) {
        Ok(new_budget) => new_budget,
        Err(error) if is_form_error(&error) => {
            return match get_categories_by_kind(user_id, CategoryKind::Expense, &connection) {
                Ok(categories) => budget_form(
                    BudgetFormTarget::Create,
                    &categories,
                    &form,
                    Some(&error.to_string()),
                )
                .into_response(),
                Err(error) => {
                    tracing::error!("Could not get expense categories: {error}");
                    error.into_alert_response()
                }
            };
        }
        Err(error) => {
            tracing::error!("Could not validate budget form: {error}");
            return error.into_alert_response();
        }
    };

    match create_budget(user_id, new_budget, &connection) {
        Ok(budget) => {
            tracing::debug!("User {user_id} added budget {}", budget.id);
            (
                HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not create budget: {error}");
            error.into_alert_response()
        }
    }
}
