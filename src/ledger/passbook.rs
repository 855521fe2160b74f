//! Defines the passbook query, a read-only view of an account's transactions.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    account::find_account,
    ledger::{Transaction, get_transactions},
    timezone::get_timezone,
};

/// The state needed to read a passbook.
#[derive(Debug, Clone)]
pub struct PassbookState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The canonical name of the timezone to report transaction dates in.
    pub local_timezone: String,
}

impl FromRef<AppState> for PassbookState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Query parameters for the passbook.
#[derive(Debug, Default, Deserialize)]
pub struct PassbookQuery {
    /// Only return this many of the most recent transactions.
    pub limit: Option<usize>,
}

/// A route handler for getting an account's transactions, oldest first.
///
/// Errors are sent as plain text.
pub async fn get_passbook_endpoint(
    State(state): State<PassbookState>,
    Path(account_number): Path<String>,
    query: Result<Query<PassbookQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            return Error::InvalidRequest(rejection.body_text()).into_plain_response();
        }
    };

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

    match get_passbook(&account_number, query.limit, &connection) {
        Ok(transactions) => Json(
            transactions
                .into_iter()
                .map(|transaction| transaction.in_timezone(timezone))
                .collect::<Vec<_>>(),
        )
        .into_response(),
        Err(error) => error.into_plain_response(),
    }
}

/// Get the transactions for an account in the order they were recorded.
///
/// The whole passbook is returned unless `limit` is set, in which case only
/// the `limit` most recent transactions are returned, still oldest first.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidRequest] if `limit` is zero,
/// - or [Error::AccountNotFound] if there is no account with `account_number`,
/// - or [Error::NoTransactions] if the account has no transactions,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_passbook(
    account_number: &str,
    limit: Option<usize>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    if limit == Some(0) {
        return Err(Error::InvalidRequest(
            "limit must be greater than zero".to_owned(),
        ));
    }

    let account = find_account(account_number, connection)?.ok_or(Error::AccountNotFound)?;
    let mut transactions = get_transactions(account.id, connection)?;

    if transactions.is_empty() {
        return Err(Error::NoTransactions);
    }

    if let Some(limit) = limit {
        let skip = transactions.len().saturating_sub(limit);
        transactions.drain(..skip);
    }

    Ok(transactions)
}
