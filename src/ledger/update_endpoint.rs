//! Defines the credit/debit operation and its endpoint.
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    body::Bytes,
    extract::{FromRef, Path, State, rejection::BytesRejection},
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior, params};
use serde::Serialize;
use serde_json::{Value, value::RawValue};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    account::{Account, find_account, get_account},
    ledger::{
        Transaction, TransactionKind,
        core::{get_latest_transaction_date, insert_transaction},
    },
    timezone::get_timezone,
};

/// The state needed to credit or debit an account.
#[derive(Debug, Clone)]
pub struct UpdateAmountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The canonical name of the timezone to report transaction dates in.
    pub local_timezone: String,
}

impl FromRef<AppState> for UpdateAmountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The request body for crediting or debiting an account.
///
/// The fields are kept as raw JSON so that missing, non-numeric and unknown
/// values can each be reported with their own error.
#[derive(Debug, Default, Clone, Serialize)]
pub struct AmountUpdate {
    /// How much money to move.
    pub amount: Option<Value>,
    /// Either "credit" or "debit".
    #[serde(rename = "type")]
    pub kind: Option<Value>,
}

impl AmountUpdate {
    /// Create a well-formed request.
    pub fn new(amount: f64, kind: TransactionKind) -> Self {
        Self {
            amount: Some(Value::from(amount)),
            kind: Some(Value::from(kind.as_str())),
        }
    }

    /// Parse a request body, which must be a JSON object.
    ///
    /// Fields set to `null` count as missing. Numbers too large for an `f64`
    /// are kept as invalid values so they are reported as an invalid amount
    /// rather than a malformed request.
    ///
    /// # Errors
    /// Returns [Error::InvalidRequest] if `body` is not a JSON object.
    pub fn from_json(body: &[u8]) -> Result<Self, Error> {
        let mut fields: HashMap<String, Box<RawValue>> =
            serde_json::from_slice(body).map_err(|error| {
                Error::InvalidRequest(format!("Request body must be a JSON object: {error}"))
            })?;

        Ok(Self {
            amount: fields.remove("amount").and_then(|raw| parse_field(&raw)),
            kind: fields.remove("type").and_then(|raw| parse_field(&raw)),
        })
    }

    /// Check the request fields, in order: presence, amount, then type.
    fn validate(&self) -> Result<(f64, TransactionKind), Error> {
        let (Some(amount), Some(kind)) = (&self.amount, &self.kind) else {
            return Err(Error::InvalidRequest(
                "Amount and type are required".to_owned(),
            ));
        };

        let amount = amount
            .as_f64()
            .filter(|amount| amount.is_finite() && *amount > 0.0)
            .ok_or(Error::InvalidAmount)?;

        let kind = kind.as_str().ok_or(Error::InvalidKind)?.parse()?;

        Ok((amount, kind))
    }
}

/// Convert a raw JSON field to a [Value], `None` for `null`.
fn parse_field(raw: &RawValue) -> Option<Value> {
    let text = raw.get().trim();

    if text == "null" {
        return None;
    }

    // Out of range numbers become `Value::Null`, which is not a valid amount.
    if let Ok(number) = text.parse::<f64>() {
        return Some(Value::from(number));
    }

    Some(serde_json::from_str(text).unwrap_or(Value::Null))
}

/// A route handler for crediting or debiting an account, responds with the updated account.
pub async fn update_amount_endpoint(
    State(state): State<UpdateAmountState>,
    Path(account_number): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let update = match body
        .map_err(|rejection| Error::InvalidRequest(rejection.body_text()))
        .and_then(|body| AmountUpdate::from_json(&body))
    {
        Ok(update) => update,
        Err(error) => {
            tracing::debug!("Rejected update for account {account_number}: {error}");
            return error.into_response();
        }
    };

    let timezone = match get_timezone(&state.local_timezone) {
        Ok(timezone) => timezone,
        Err(error) => return error.into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match update_amount(&account_number, &update, &connection) {
        Ok(account) => Json(account.in_timezone(timezone)).into_response(),
        Err(error) => {
            tracing::warn!("Could not update account {account_number} with {update:?}: {error}");
            error.into_response()
        }
    }
}

/// Credit or debit an account and record the transaction in its passbook.
///
/// The request is fully validated before anything is written. The balance
/// update and the new transaction are committed together in a single SQL
/// transaction, so a failure leaves the account untouched.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidRequest] if the amount or type is missing,
/// - or [Error::InvalidAmount] if the amount is not a finite number above zero,
/// - or [Error::InvalidKind] if the type is not "credit" or "debit",
/// - or [Error::AccountNotFound] if there is no account with `account_number`,
/// - or [Error::InsufficientFunds] if a debit is larger than the balance,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_amount(
    account_number: &str,
    update: &AmountUpdate,
    connection: &Connection,
) -> Result<Account, Error> {
    let (amount, kind) = update.validate()?;

    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let account = find_account(account_number, &sql_transaction)?.ok_or(Error::AccountNotFound)?;

    let new_total_amount = match kind {
        TransactionKind::Credit => account.total_amount + amount,
        TransactionKind::Debit if amount > account.total_amount => {
            return Err(Error::InsufficientFunds);
        }
        TransactionKind::Debit => account.total_amount - amount,
    };

    if !new_total_amount.is_finite() {
        return Err(Error::InvalidAmount);
    }

    // Dates within a ledger never go backwards, even if the system clock does.
    let now = OffsetDateTime::now_utc();
    let date = match get_latest_transaction_date(account.id, &sql_transaction)? {
        Some(latest) if latest > now => latest,
        _ => now,
    };

    sql_transaction.execute(
        "UPDATE account SET total_amount = ?1 WHERE id = ?2",
        params![new_total_amount, account.id],
    )?;

    insert_transaction(
        account.id,
        &Transaction {
            date,
            kind,
            amount,
            new_total_amount,
        },
        &sql_transaction,
    )?;

    let account = get_account(account_number, &sql_transaction)?;

    sql_transaction.commit()?;

    tracing::info!(
        "Applied {kind} of {amount} to account {account_number}, new balance {new_total_amount}"
    );

    Ok(account)
}
