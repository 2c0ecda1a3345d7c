//! Endpoints for deleting income and expense records.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    record::{RecordId, RecordKind, db::delete_record},
};

/// The state needed for deleting a record.
#[derive(Debug, Clone)]
pub struct DeleteRecordState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Delete an income record.
pub async fn delete_income_endpoint(
    Path(record_id): Path<RecordId>,
    State(state): State<DeleteRecordState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    delete_record_endpoint(RecordKind::Income, record_id, &state, user_id)
}

/// Delete an expense record.
pub async fn delete_expense_endpoint(
    Path(record_id): Path<RecordId>,
    State(state): State<DeleteRecordState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    delete_record_endpoint(RecordKind::Expense, record_id, &state, user_id)
}

fn delete_record_endpoint(
    kind: RecordKind,
    record_id: RecordId,
    state: &DeleteRecordState,
    user_id: UserID,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_record(kind, record_id, user_id, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: format!("{} deleted successfully", kind.label()),
        }
        .into_response(),
        Err(Error::DeleteMissingRecord) => Error::DeleteMissingRecord.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting {} record {record_id}: {error}",
                kind.table()
            );
            error.into_alert_response()
        }
    }
}
