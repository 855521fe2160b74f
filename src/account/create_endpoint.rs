//! Defines the endpoint for opening a new account.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, account::Account};

/// Account numbers are handed out sequentially from this number.
pub const FIRST_ACCOUNT_NUMBER: i64 = 100_000_001;

/// The state needed to create an account.
#[derive(Debug, Clone)]
pub struct CreateAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The profile details for a new account.
///
/// The balance is not part of the request, every account starts at zero.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewAccount {
    /// The requested account number, the next free number is used if `None`.
    pub account_number: Option<String>,
    /// The account holder's name, must not be blank.
    pub name: String,
    /// The account holder's email address.
    pub email: String,
    /// The account holder's phone number.
    pub phone: String,
    /// The account holder's Aadhaar card number.
    pub aadhar_card: String,
}

#[cfg(test)]
impl NewAccount {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Default::default()
        }
    }
}

/// A route handler for opening a new account, responds with the created account.
pub async fn create_account_endpoint(
    State(state): State<CreateAccountState>,
    payload: Result<Json<NewAccount>, JsonRejection>,
) -> Response {
    let Json(new_account) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return Error::InvalidRequest(rejection.body_text()).into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_account(&new_account, &connection) {
        Ok(account) => {
            tracing::info!("Opened account {}", account.account_number);
            (StatusCode::CREATED, Json(account)).into_response()
        }
        Err(error) => {
            tracing::warn!("Could not create account with {new_account:?}: {error}");
            error.into_response()
        }
    }
}

/// Open a new account with a zero balance.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidRequest] if the name or requested account number is blank,
/// - or [Error::AccountNumberExists] if the account number is already taken,
/// - or [Error::AccountNumbersExhausted] if no account number is left to assign,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_account(new_account: &NewAccount, connection: &Connection) -> Result<Account, Error> {
    let name = new_account.name.trim();
    if name.is_empty() {
        return Err(Error::InvalidRequest("Name is required".to_owned()));
    }

    let account_number = match &new_account.account_number {
        Some(number) if number.trim().is_empty() => {
            return Err(Error::InvalidRequest(
                "Account number cannot be blank".to_owned(),
            ));
        }
        Some(number) => number.trim().to_owned(),
        None => next_account_number(connection)?,
    };

    connection
        .execute(
            "INSERT INTO account (account_number, name, email, phone, aadhar_card, total_amount)
            VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            params![
                account_number,
                name,
                new_account.email.trim(),
                new_account.phone.trim(),
                new_account.aadhar_card.trim(),
            ],
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::AccountNumberExists(account_number.clone()),
            error => error.into(),
        })?;

    Ok(Account {
        id: connection.last_insert_rowid(),
        account_number,
        name: name.to_owned(),
        email: new_account.email.trim().to_owned(),
        phone: new_account.phone.trim().to_owned(),
        aadhar_card: new_account.aadhar_card.trim().to_owned(),
        total_amount: 0.0,
        transactions: Vec::new(),
    })
}

/// The account number after the largest numeric account number in use.
///
/// Only account numbers written exactly as an `i64` (no leading zeros, not out
/// of range) take part in the sequence. Other requested numbers can never
/// collide with a generated one.
///
/// # Errors
/// Returns [Error::AccountNumbersExhausted] if the largest number is [i64::MAX].
fn next_account_number(connection: &Connection) -> Result<String, Error> {
    let largest: Option<i64> = connection.query_one(
        "SELECT MAX(CAST(account_number AS INTEGER)) FROM account
        WHERE account_number != ''
            AND account_number NOT GLOB '*[^0-9]*'
            AND CAST(CAST(account_number AS INTEGER) AS TEXT) = account_number",
        [],
        |row| row.get(0),
    )?;

    let next = match largest {
        Some(number) => number
            .checked_add(1)
            .ok_or(Error::AccountNumbersExhausted)?
            .max(FIRST_ACCOUNT_NUMBER),
        None => FIRST_ACCOUNT_NUMBER,
    };

    Ok(next.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{
        Error,
        account::{
            create_account_endpoint,
            create_endpoint::{CreateAccountState, FIRST_ACCOUNT_NUMBER, NewAccount},
            get_account,
        },
        db::initialize,
    };

    use super::create_account;

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn assigns_sequential_account_numbers() {
        let conn = get_test_connection();

        let first = create_account(&NewAccount::named("first"), &conn).unwrap();
        let second = create_account(&NewAccount::named("second"), &conn).unwrap();

        assert_eq!(first.account_number, FIRST_ACCOUNT_NUMBER.to_string());
        assert_eq!(
            second.account_number,
            (FIRST_ACCOUNT_NUMBER + 1).to_string()
        );
    }

    #[test]
    fn continues_after_largest_numeric_account_number() {
        let conn = get_test_connection();
        let requested = NewAccount {
            account_number: Some("200000000".to_owned()),
            ..NewAccount::named("requested")
        };
        let non_numeric = NewAccount {
            account_number: Some("SAVINGS-1".to_owned()),
            ..NewAccount::named("non numeric")
        };
        create_account(&requested, &conn).unwrap();
        create_account(&non_numeric, &conn).unwrap();

        let next = create_account(&NewAccount::named("next"), &conn).unwrap();

        assert_eq!(next.account_number, "200000001");
    }

    #[test]
    fn ignores_requested_numbers_outside_i64_range() {
        let conn = get_test_connection();
        let huge = NewAccount {
            account_number: Some("99999999999999999999".to_owned()),
            ..NewAccount::named("huge")
        };
        let padded = NewAccount {
            account_number: Some("0300000000".to_owned()),
            ..NewAccount::named("padded")
        };
        create_account(&huge, &conn).unwrap();
        create_account(&padded, &conn).unwrap();

        let first = create_account(&NewAccount::named("first"), &conn).unwrap();
        let second = create_account(&NewAccount::named("second"), &conn).unwrap();

        assert_eq!(first.account_number, FIRST_ACCOUNT_NUMBER.to_string());
        assert_eq!(
            second.account_number,
            (FIRST_ACCOUNT_NUMBER + 1).to_string()
        );
    }

    #[test]
    fn fails_when_account_numbers_are_exhausted() {
        let conn = get_test_connection();
        let largest = NewAccount {
            account_number: Some(i64::MAX.to_string()),
            ..NewAccount::named("largest")
        };
        create_account(&largest, &conn).unwrap();

        let result = create_account(&NewAccount::named("next"), &conn);

        assert_eq!(result, Err(Error::AccountNumbersExhausted));
    }

    #[test]
    fn uses_requested_account_number() {
        let conn = get_test_connection();
        let new_account = NewAccount {
            account_number: Some(" 12345 ".to_owned()),
            email: "salman@example.com".to_owned(),
            phone: "9876543210".to_owned(),
            aadhar_card: "1234 5678 9012".to_owned(),
            ..NewAccount::named("Salman")
        };

        let account = create_account(&new_account, &conn).unwrap();

        assert_eq!(account.account_number, "12345");
        assert_eq!(get_account("12345", &conn), Ok(account));
    }

    #[test]
    fn rejects_duplicate_account_number() {
        let conn = get_test_connection();
        let new_account = NewAccount {
            account_number: Some("12345".to_owned()),
            ..NewAccount::named("Salman")
        };
        create_account(&new_account, &conn).unwrap();

        let result = create_account(&new_account, &conn);

        assert_eq!(result, Err(Error::AccountNumberExists("12345".to_owned())));
    }

    #[test]
    fn rejects_blank_name() {
        let conn = get_test_connection();

        let result = create_account(&NewAccount::named("   "), &conn);

        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn rejects_blank_account_number() {
        let conn = get_test_connection();
        let new_account = NewAccount {
            account_number: Some(String::new()),
            ..NewAccount::named("Salman")
        };

        let result = create_account(&new_account, &conn);

        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn endpoint_responds_with_created() {
        let state = CreateAccountState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        };

        let response =
            create_account_endpoint(State(state.clone()), Ok(Json(NewAccount::named("Salman"))))
                .await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let connection = state.db_connection.lock().unwrap();
        assert!(get_account(&FIRST_ACCOUNT_NUMBER.to_string(), &connection).is_ok());
    }

    #[tokio::test]
    async fn endpoint_responds_with_conflict_for_duplicate() {
        let state = CreateAccountState {
            db_connection: Arc::new(Mutex::new(get_test_connection())),
        };
        let new_account = NewAccount {
            account_number: Some("42".to_owned()),
            ..NewAccount::named("Salman")
        };
        create_account_endpoint(State(state.clone()), Ok(Json(new_account.clone()))).await;

        let response = create_account_endpoint(State(state), Ok(Json(new_account))).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
