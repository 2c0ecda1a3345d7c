//! Category creation form and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{CategoryKind, CategoryName, create_category, domain::NewCategoryForm},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
    },
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form for adding a category, shown at the top of the categories page.
///
/// `form` holds the values from a failed submission so the user does not
/// need to type them again.
pub(super) fn new_category_form(form: &NewCategoryForm, error_message: Option<&str>) -> Markup {
    let name = form.name.as_deref().unwrap_or_default();
    let description = form.description.as_deref().unwrap_or_default();
    let selected_kind = form
        .kind
        .as_deref()
        .and_then(|kind| kind.parse().ok())
        .unwrap_or(CategoryKind::Expense);

    html! {
        form
            hx-post=(endpoints::POST_CATEGORY)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    value=(name)
                    placeholder="e.g. Groceries"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    id="description"
                    type="text"
                    name="description"
                    value=(description)
                    placeholder="Optional"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            fieldset
            {
                legend class=(FORM_LABEL_STYLE) { "Type" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    @for kind in [CategoryKind::Expense, CategoryKind::Income] {
                        label class="flex items-center gap-3"
                        {
                            input
                                type="radio"
                                name="kind"
                                value=(kind.as_str())
                                checked[kind == selected_kind]
                                class=(FORM_RADIO_INPUT_STYLE);

                            span class=(FORM_RADIO_LABEL_STYLE) { (kind.label()) }
                        }
                    }
                }
            }

            @if let Some(error_message) = error_message {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Category" }
        }
    }
}

/// Handle category creation form submission.
///
/// Invalid input re-renders the form with an error message. On success the
/// client is redirected to the categories page so the new category shows up
/// in its table.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<NewCategoryForm>,
) -> Response {
    let name = match CategoryName::new(form.name.as_deref().unwrap_or_default()) {
        Ok(name) => name,
        Err(error) => return new_category_form(&form, Some(&error.to_string())).into_response(),
    };

    let kind: CategoryKind = match form.kind.as_deref().unwrap_or_default().parse() {
        Ok(kind) => kind,
        Err(error) => return new_category_form(&form, Some(&error.to_string())).into_response(),
    };

    let description = form.description.as_deref().unwrap_or_default().trim();

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_category(user_id, name, description, kind, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::DuplicateCategoryName) => {
            new_category_form(&form, Some(&Error::DuplicateCategoryName.to_string()))
                .into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");

            error.into_alert_response()
        }
    }
}
