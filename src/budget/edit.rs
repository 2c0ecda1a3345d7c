//! Budget editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    budget::{
        BudgetForm, BudgetId,
        db::{get_budget, update_budget},
        form::{BudgetFormTarget, budget_form, is_form_error, parse_budget_form},
    },
    category::{Category, CategoryKind, get_categories_by_kind},
    endpoints,
    html::{BUTTON_SECONDARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
};

/// The state needed for the edit budget page and endpoint.
#[derive(Debug, Clone)]
pub struct EditBudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the budget editing page.
///
/// Budgets that do not exist or belong to another user redirect to the
/// budgets page.
pub async fn get_edit_budget_page(
    Path(budget_id): Path<BudgetId>,
    State(state): State<EditBudgetState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budget = match get_budget(budget_id, user_id, &connection) {
        Ok(budget) => budget,
        Err(Error::NotFound) => {
            tracing::warn!("User {user_id} tried to edit missing budget {budget_id}");
            return Ok(Redirect::to(endpoints::BUDGETS_VIEW).into_response());
        }
        Err(error) => {
            tracing::error!("Failed to retrieve budget {budget_id}: {error}");
            return Err(error);
        }
    };

    let categories = get_categories_by_kind(user_id, CategoryKind::Expense, &connection)?;

    Ok(edit_budget_view(budget_id, &categories, &BudgetForm::from(&budget)).into_response())
}

/// Handle budget update form submission.
pub async fn update_budget_endpoint(
    Path(budget_id): Path<BudgetId>,
    State(state): State<EditBudgetState>,
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

    match get_budget(budget_id, user_id, &connection) {
        Ok(_) => {}
        Err(Error::NotFound) => {
            tracing::warn!("User {user_id} tried to update missing budget {budget_id}");
            return Error::UpdateMissingBudget.into_alert_response();
        }
        Err(error) => {
            tracing::error!("Failed to retrieve budget {budget_id}: {error}");
            return error.into_alert_response();
        }
    }

    let new_budget = match parse_budget_form(user_id, &form, Some(budget_id), &connection) {
        Ok(new_budget) => new_budget,
        Err(error) if is_form_error(&error) => {
            return match get_categories_by_kind(user_id, CategoryKind::Expense, &connection) {
                Ok(categories) => budget_form(
                    BudgetFormTarget::Update(budget_id),
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

    match update_budget(budget_id, user_id, &new_budget, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingBudget) => Error::UpdateMissingBudget.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating budget {budget_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_budget_view(budget_id: BudgetId, categories: &[Category], values: &BudgetForm) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();
    let form = budget_form(BudgetFormTarget::Update(budget_id), categories, values, None);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Edit Budget" }

                (form)

                a href=(endpoints::BUDGETS_VIEW) class=(BUTTON_SECONDARY_STYLE) { "Cancel" }
            }
        }
    };

    base("Edit Budget", &[dollar_input_styles()], &content)
}
