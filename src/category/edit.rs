//! Category editing page and endpoint.

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
    category::{
        Category, CategoryId, CategoryName, count_records_per_category, domain::EditCategoryForm,
        get_category, update_category,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, CATEGORY_BADGE_STYLE, FORM_CONTAINER_STYLE,
        FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
    },
    navigation::NavBar,
};

/// The state needed for the edit category page and endpoint.
#[derive(Debug, Clone)]
pub struct EditCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category editing page.
///
/// Categories that do not exist or belong to another user redirect to the
/// categories page.
pub async fn get_edit_category_page(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = match get_category(category_id, user_id, &connection) {
        Ok(category) => category,
        Err(Error::NotFound) => {
            tracing::warn!("User {user_id} tried to edit missing category {category_id}");
            return Ok(Redirect::to(endpoints::CATEGORIES_VIEW).into_response());
        }
        Err(error) => {
            tracing::error!("Failed to retrieve category {category_id}: {error}");
            return Err(error);
        }
    };

    let usage_count = count_records_per_category(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not count records per category: {error}"))?
        .get(&category.id)
        .copied()
        .unwrap_or(0);

    Ok(edit_category_view(&category, usage_count).into_response())
}

/// Handle category update form submission.
pub async fn update_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<EditCategoryForm>,
) -> Response {
    let update_endpoint = endpoints::format_endpoint(endpoints::CATEGORY, category_id);
    let raw_name = form.name.as_deref().unwrap_or_default();
    let description = form.description.as_deref().unwrap_or_default().trim();

    let name = match CategoryName::new(raw_name) {
        Ok(name) => name,
        Err(error) => {
            return edit_category_form(
                &update_endpoint,
                raw_name,
                description,
                Some(&error.to_string()),
            )
            .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_category(category_id, user_id, &name, description, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::DuplicateCategoryName) => edit_category_form(
            &update_endpoint,
            raw_name,
            description,
            Some(&Error::DuplicateCategoryName.to_string()),
        )
        .into_response(),
        Err(Error::UpdateMissingCategory) => Error::UpdateMissingCategory.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_category_view(category: &Category, usage_count: u64) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();
    let update_endpoint = endpoints::format_endpoint(endpoints::CATEGORY, category.id);
    let form = edit_category_form(
        &update_endpoint,
        category.name.as_ref(),
        &category.description,
        None,
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Edit Category" }

                dl class="grid grid-cols-2 gap-2 text-sm"
                {
                    dt class="font-medium" { "Type" }
                    dd { span class=(CATEGORY_BADGE_STYLE) { (category.kind.label()) } }

                    dt class="font-medium" { "Used by" }
                    dd { (usage_count) " transaction(s)" }
                }

                (form)

                a href=(endpoints::CATEGORIES_VIEW) class=(BUTTON_SECONDARY_STYLE) { "Cancel" }
            }
        }
    };

    base("Edit Category", &[], &content)
}

fn edit_category_form(
    update_endpoint: &str,
    name: &str,
    description: &str,
    error_message: Option<&str>,
) -> Markup {
    html! {
        form
            hx-put=(update_endpoint)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    value=(name)
                    required
                    autofocus
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
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if let Some(error_message) = error_message {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Update Category" }
        }
    }
}

#[cfg(test)]
mod edit_category_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;

    use crate::{
        auth::UserID,
        category::{CategoryKind, get_category},
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_form_error_message, assert_form_input_with_value, assert_hx_endpoint,
            assert_hx_redirect, assert_valid_html, get_test_connection, insert_test_category,
            insert_test_user, must_get_form, parse_html_document, parse_html_fragment,
        },
    };

    use super::{
        EditCategoryForm, EditCategoryState, get_edit_category_page, update_category_endpoint,
    };

    fn get_state() -> (EditCategoryState, UserID, i64) {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "jane@example.com");
        let category_id = insert_test_category(&connection, user_id, "Food", CategoryKind::Expense);
        insert_test_category(&connection, user_id, "Travel", CategoryKind::Expense);

        (
            EditCategoryState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user_id,
            category_id,
        )
    }

    fn form(name: &str, description: &str) -> EditCategoryForm {
        EditCategoryForm {
            name: Some(name.to_owned()),
            description: Some(description.to_owned()),
        }
    }

    #[tokio::test]
    async fn edit_page_shows_current_values() {
        let (state, user_id, category_id) = get_state();

        let response = get_edit_category_page(Path(category_id), State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::CATEGORY, category_id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "name", "text", "Food");
    }

    #[tokio::test]
    async fn edit_page_redirects_on_unknown_category() {
        let (state, _, category_id) = get_state();
        let other_user = {
            let connection = state.db_connection.lock().unwrap();
            insert_test_user(&connection, "john@example.com")
        };

        let response =
            get_edit_category_page(Path(category_id), State(state), Extension(other_user))
                .await
                .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            endpoints::CATEGORIES_VIEW
        );
    }

    #[tokio::test]
    async fn update_changes_name_and_description() {
        let (state, user_id, category_id) = get_state();

        let response = update_category_endpoint(
            Path(category_id),
            State(state.clone()),
            Extension(user_id),
            Form(form("Groceries", "Supermarket runs")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CATEGORIES_VIEW);
        let category =
            get_category(category_id, user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(category.name.as_ref(), "Groceries");
        assert_eq!(category.description, "Supermarket runs");
        assert_eq!(category.kind, CategoryKind::Expense);
    }

    #[tokio::test]
    async fn update_fails_on_empty_name() {
        let (state, user_id, category_id) = get_state();

        let response = update_category_endpoint(
            Path(category_id),
            State(state),
            Extension(user_id),
            Form(form("", "")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_form_error_message(&must_get_form(&html), "Category name is required");
    }

    #[tokio::test]
    async fn update_fails_on_duplicate_name() {
        let (state, user_id, category_id) = get_state();

        let response = update_category_endpoint(
            Path(category_id),
            State(state),
            Extension(user_id),
            Form(form("Travel", "")),
        )
        .await;

        let html = parse_html_fragment(response).await;
        assert_form_error_message(
            &must_get_form(&html),
            "A category with this name already exists",
        );
    }

    #[tokio::test]
    async fn update_missing_category_returns_alert() {
        let (state, user_id, _) = get_state();

        let response = update_category_endpoint(
            Path(999),
            State(state),
            Extension(user_id),
            Form(form("Anything", "")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
