//! Defines the endpoint for looking up a single account.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, account::get_account, timezone::get_timezone};

/// The state needed to look up an account.
#[derive(Debug, Clone)]
pub struct GetAccountState {
    /// The database connection for reading accounts.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The canonical name of the timezone to report transaction dates in.
    pub local_timezone: String,
}

impl FromRef<AppState> for GetAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for getting an account and its transactions by account number.
///
/// Missing accounts get a plain text 404 response.
pub async fn get_account_endpoint(
    State(state): State<GetAccountState>,
    Path(account_number): Path<String>,
) -> Response {
    let timezone = match get_timezone(&state.local_timezone) {
        Ok(timezone) => timezone,
        Err(error) => return error.into_plain_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_plain_response();
        }
    };

    match get_account(&account_number, &connection) {
        Ok(account) => Json(account.in_timezone(timezone)).into_response(),
        Err(error) => error.into_plain_response(),
    }
}
