//! Route handlers for the contact form messages.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    contact::core::{
        NewContactMessage, create_contact_message, delete_contact_message, get_contact_messages,
    },
    database_id::DatabaseId,
};

/// The state needed to manage contact messages.
#[derive(Debug, Clone)]
pub struct ContactState {
    /// The database connection for managing contact messages.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ContactState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for saving a contact message, responds with the saved message.
pub async fn create_contact_endpoint(
    State(state): State<ContactState>,
    payload: Result<Json<NewContactMessage>, JsonRejection>,
) -> Response {
    let Json(new_message) = match payload {
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

    match create_contact_message(&new_message, &connection) {
        Ok(message) => (StatusCode::CREATED, Json(message)).into_response(),
        Err(error) => error.into_response(),
    }
}

/// A route handler for listing every contact message.
pub async fn list_contacts_endpoint(State(state): State<ContactState>) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_contact_messages(&connection) {
        Ok(messages) => Json(messages).into_response(),
        Err(error) => error.into_response(),
    }
}

/// A route handler for deleting a contact message, responds with no content.
pub async fn delete_contact_endpoint(
    State(state): State<ContactState>,
    Path(id): Path<DatabaseId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_contact_message(id, &connection) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => {
            tracing::warn!("Could not delete contact message {id}: {error}");
            error.into_response()
        }
    }
}
