//! Pages and endpoints for editing income and expense records.

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
    category::{Category, get_categories_by_kind},
    html::{BUTTON_SECONDARY_STYLE, FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
    record::{
        RecordForm, RecordId, RecordKind,
        db::{get_record, update_record},
        form::{RecordFormTarget, parse_record_form, record_form},
    },
};

/// The state needed for the edit pages and update endpoints.
#[derive(Debug, Clone)]
pub struct EditRecordState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the page for editing an income record.
pub async fn get_edit_income_page(
    Path(record_id): Path<RecordId>,
    State(state): State<EditRecordState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    edit_record_page(RecordKind::Income, record_id, &state, user_id)
}

/// Render the page for editing an expense record.
pub async fn get_edit_expense_page(
    Path(record_id): Path<RecordId>,
    State(state): State<EditRecordState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    edit_record_page(RecordKind::Expense, record_id, &state, user_id)
}

/// Update an income record, redirecting to the income page on success.
pub async fn update_income_endpoint(
    Path(record_id): Path<RecordId>,
    State(state): State<EditRecordState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<RecordForm>,
) -> Response {
    update_record_endpoint(RecordKind::Income, record_id, &state, user_id, &form)
}

/// Update an expense record, redirecting to the expenses page on success.
pub async fn update_expense_endpoint(
    Path(record_id): Path<RecordId>,
    State(state): State<EditRecordState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<RecordForm>,
) -> Response {
    update_record_endpoint(RecordKind::Expense, record_id, &state, user_id, &form)
}

fn edit_record_page(
    kind: RecordKind,
    record_id: RecordId,
    state: &EditRecordState,
    user_id: UserID,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let record = match get_record(kind, record_id, user_id, &connection) {
        Ok(record) => record,
        Err(Error::NotFound) => {
            tracing::warn!(
                "User {user_id} tried to edit missing {} record {record_id}",
                kind.table()
            );
            return Ok(Redirect::to(kind.list_view()).into_response());
        }
        Err(error) => {
            tracing::error!("Could not get {} record {record_id}: {error}", kind.table());
            return Err(error);
        }
    };

    let categories = get_categories_by_kind(user_id, kind.category_kind(), &connection)?;

    Ok(edit_record_view(kind, record_id, &categories, &RecordForm::from(&record)).into_response())
}

fn edit_record_view(
    kind: RecordKind,
    record_id: RecordId,
    categories: &[Category],
    values: &RecordForm,
) -> Markup {
    let nav_bar = NavBar::new(kind.list_view()).into_html();
    let form = record_form(
        kind,
        RecordFormTarget::Update(record_id),
        categories,
        values,
        None,
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-4"
            {
                h1 class="text-xl font-bold" { "Edit " (kind.label()) }

                (form)

                a href=(kind.list_view()) class=(BUTTON_SECONDARY_STYLE) { "Cancel" }
            }
        }
    };

    base(
        &format!("Edit {}", kind.label()),
        &[dollar_input_styles()],
        &content,
    )
}

fn update_record_endpoint(
    kind: RecordKind,
    record_id: RecordId,
    state: &EditRecordState,
    user_id: UserID,
    form: &RecordForm,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let new_record = match parse_record_form(kind, user_id, form, &connection) {
        Ok(new_record) => new_record,
        Err(error @ (Error::InvalidAmount | Error::InvalidCategory | Error::MissingDate)) => {
            return match get_categories_by_kind(user_id, kind.category_kind(), &connection) {
                Ok(categories) => record_form(
                    kind,
                    RecordFormTarget::Update(record_id),
                    &categories,
                    form,
                    Some(&error.to_string()),
                )
                .into_response(),
                Err(error) => {
                    tracing::error!("Could not get categories: {error}");
                    error.into_alert_response()
                }
            };
        }
        Err(error) => {
            tracing::error!("Could not validate {} form: {error}", kind.table());
            return error.into_alert_response();
        }
    };

    match update_record(kind, record_id, user_id, &new_record, &connection) {
        Ok(()) => (
            HxRedirect(kind.list_view().to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingRecord) => Error::UpdateMissingRecord.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating {} record {record_id}: {error}",
                kind.table()
            );
            error.into_alert_response()
        }
    }
}
