//! Defines the app level error type and its conversions to HTTP responses.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request was missing required fields or could not be parsed.
    ///
    /// The string describes what was wrong with the request and is shown to
    /// the client.
    #[error("{0}")]
    InvalidRequest(String),

    /// The transaction amount was not a finite number greater than zero.
    #[error("Transaction amount must be a positive number")]
    InvalidAmount,

    /// The transaction type was something other than "credit" or "debit".
    #[error("Invalid transaction type")]
    InvalidKind,

    /// No account exists with the requested account number.
    #[error("Account not found")]
    AccountNotFound,

    /// A debit asked for more money than the account holds.
    #[error("Insufficient funds for debit")]
    InsufficientFunds,

    /// The passbook was requested for an account with an empty ledger.
    #[error("No transactions found for this account")]
    NoTransactions,

    /// The specified account number is already in use.
    #[error("Account number {0} already exists")]
    AccountNumberExists(String),

    /// Every account number in the sequence has been handed out.
    #[error("No account numbers left to assign")]
    AccountNumbersExhausted,

    /// No contact message exists with the requested ID.
    #[error("Contact message not found")]
    ContactNotFound,

    /// The configured timezone is not a valid, canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// A response body could not be read while it was being logged.
    #[error("could not read response body: {0}")]
    ResponseBodyError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    ///
    /// The inner error is only logged, clients get a generic message.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(error: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", error);
        Error::SqlError(error)
    }
}

const INTERNAL_ERROR_MESSAGE: &str =
    "Something went wrong. Try again later or check the server logs.";

impl Error {
    /// The HTTP status code that best describes the error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidRequest(_)
            | Error::InvalidAmount
            | Error::InvalidKind
            | Error::InsufficientFunds => StatusCode::BAD_REQUEST,
            Error::AccountNotFound | Error::NoTransactions | Error::ContactNotFound => {
                StatusCode::NOT_FOUND
            }
            Error::AccountNumberExists(_) | Error::AccountNumbersExhausted => {
                StatusCode::CONFLICT
            }
            Error::InvalidTimezone(_)
            | Error::ResponseBodyError(_)
            | Error::DatabaseLockError
            | Error::SqlError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message to show the client.
    ///
    /// Server side failures are logged here and replaced with a generic message.
    fn client_message(&self) -> String {
        match self.status_code() {
            StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("An unexpected error occurred: {}", self);
                INTERNAL_ERROR_MESSAGE.to_owned()
            }
            _ => self.to_string(),
        }
    }

    /// Render the error as a plain text response instead of a JSON object.
    pub fn into_plain_response(self) -> Response {
        (self.status_code(), self.client_message()).into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(json!({ "error": self.client_message() })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
    use serde_json::Value;

    use super::Error;

    #[tokio::test]
    async fn renders_json_error_body() {
        let response = Error::InsufficientFunds.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "Insufficient funds for debit");
    }

    #[tokio::test]
    async fn renders_plain_text_body() {
        let response = Error::NoTransactions.into_plain_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, "No transactions found for this account");
    }

    #[tokio::test]
    async fn hides_sql_error_details() {
        let response = Error::SqlError(rusqlite::Error::InvalidQuery).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert!(!body["error"].as_str().unwrap().contains("SQL"));
    }

    #[test]
    fn maps_errors_to_status_codes() {
        assert_eq!(
            Error::InvalidRequest("bad".to_owned()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::InvalidAmount.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::InvalidKind.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::AccountNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::AccountNumberExists("1".to_owned()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::DatabaseLockError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
