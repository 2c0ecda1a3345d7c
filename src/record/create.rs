//! Endpoints for adding income and expense records.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    category::get_categories_by_kind,
    record::{
        RecordForm, RecordKind,
        db::create_record,
        form::{RecordFormTarget, parse_record_form, record_form},
    },
};

/// The state needed to create a record.
#[derive(Debug, Clone)]
pub struct CreateRecordState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Add an income record, redirecting to the income page on success.
pub async fn create_income_endpoint(
    State(state): State<CreateRecordState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<RecordForm>,
) -> Response {
    create_record_endpoint(RecordKind::Income, &state, user_id, &form)
}

/// Add an expense record, redirecting to the expenses page on success.
pub async fn create_expense_endpoint(
    State(state): State<CreateRecordState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<RecordForm>,
) -> Response {
    create_record_endpoint(RecordKind::Expense, &state, user_id, &form)
}

fn create_record_endpoint(
    kind: RecordKind,
    state: &CreateRecordState,
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
        Err(
            error @ (Error::InvalidAmount | Error::InvalidCategory | Error::MissingDate),
        ) => {
            let categories = match get_categories_by_kind(user_id, kind.category_kind(), &connection)
            {
                Ok(categories) => categories,
                Err(error) => {
                    tracing::error!("Could not get categories: {error}");
                    return error.into_alert_response();
                }
            };

            return record_form(
                kind,
                RecordFormTarget::Create,
                &categories,
                form,
                Some(&error.to_string()),
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("Could not validate {} form: {error}", kind.table());
            return error.into_alert_response();
        }
    };

    match create_record(kind, user_id, new_record, &connection) {
        Ok(record) => {
            tracing::debug!("User {user_id} added {} record {}", kind.table(), record.id);
            (
                HxRedirect(kind.list_view().to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("Could not create {} record: {error}", kind.table());
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod create_record_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use time::macros::date;

    use crate::{
        auth::UserID,
        category::CategoryKind,
        endpoints,
        record::{RecordForm, RecordKind, db::get_records_with_category},
        test_utils::{
            assert_form_error_message, assert_form_input_with_value, assert_hx_redirect,
            assert_valid_html, get_test_connection, insert_test_category, insert_test_user, must_get_form,
            parse_html_fragment,
        },
    };

    use super::{CreateRecordState, create_expense_endpoint, create_income_endpoint};

    fn setup() -> (CreateRecordState, UserID, i64, i64) {
        let connection = get_test_connection();
        let user_id = insert_test_user(&connection, "jane@example.com");
        let salary = insert_test_category(&connection, user_id, "Salary", CategoryKind::Income);
        let food = insert_test_category(&connection, user_id, "Food", CategoryKind::Expense);

        (
            CreateRecordState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user_id,
            salary,
            food,
        )
    }

    fn form(amount: &str, category_id: i64, date: &str) -> RecordForm {
        RecordForm {
            amount: Some(amount.to_owned()),
            category_id: Some(category_id.to_string()),
            description: Some("Weekly shop".to_owned()),
            date: Some(date.to_owned()),
        }
    }

    #[tokio::test]
    async fn can_create_expense() {
        let (state, user_id, _, food) = setup();

        let response = create_expense_endpoint(
            State(state.clone()),
            Extension(user_id),
            Form(form("54.20", food, "2025-05-02")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::EXPENSES_VIEW);
        let records = get_records_with_category(
            RecordKind::Expense,
            user_id,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record.amount, 54.2);
        assert_eq!(records[0].record.date, date!(2025 - 05 - 02));
        assert_eq!(records[0].category_name, "Food");
    }

    #[tokio::test]
    async fn can_create_income() {
        let (state, user_id, salary, _) = setup();

        let response = create_income_endpoint(
            State(state),
            Extension(user_id),
            Form(form("2000", salary, "2025-05-01")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::INCOME_VIEW);
    }

    #[tokio::test]
    async fn rejects_expense_with_income_category() {
        let (state, user_id, salary, _) = setup();

        let response = create_expense_endpoint(
            State(state),
            Extension(user_id),
            Form(form("10", salary, "2025-05-01")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_form_error_message(&must_get_form(&html), "Please select a category");
    }

    #[tokio::test]
    async fn rejects_zero_amount_and_keeps_input() {
        let (state, user_id, _, food) = setup();

        let response = create_expense_endpoint(
            State(state),
            Extension(user_id),
            Form(form("0", food, "2025-05-01")),
        )
        .await;

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Please enter a valid amount");
        assert_form_input_with_value(&form, "date", "date", "2025-05-01");
    }

    #[tokio::test]
    async fn rejects_missing_date() {
        let (state, user_id, _, food) = setup();

        let response = create_expense_endpoint(
            State(state),
            Extension(user_id),
            Form(form("10", food, "")),
        )
        .await;

        let html = parse_html_fragment(response).await;
        assert_form_error_message(&must_get_form(&html), "Please select a date");
    }
}
