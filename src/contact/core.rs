//! Defines the contact message model and its database queries.

use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, database_id::DatabaseId};

/// A message left through the contact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    /// The database ID of the message.
    pub id: DatabaseId,
    /// Who left the message.
    pub name: String,
    /// How to reply to the sender.
    pub email: String,
    /// The message text.
    pub message: String,
    /// When the message was received.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The form data for a new contact message.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewContactMessage {
    /// Who left the message, must not be blank.
    pub name: String,
    /// How to reply to the sender, must not be blank.
    pub email: String,
    /// The message text, must not be blank.
    pub message: String,
}

pub fn create_contact_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS contact_message (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            message TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_contact_message(row: &Row) -> Result<ContactMessage, rusqlite::Error> {
    Ok(ContactMessage {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        message: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Save a new contact message.
///
/// # Errors
/// Returns [Error::InvalidRequest] if any field is blank, or [Error::SqlError]
/// if there is an SQL error.
pub fn create_contact_message(
    new_message: &NewContactMessage,
    connection: &Connection,
) -> Result<ContactMessage, Error> {
    for (field, value) in [
        ("name", &new_message.name),
        ("email", &new_message.email),
        ("message", &new_message.message),
    ] {
        if value.trim().is_empty() {
            return Err(Error::InvalidRequest(format!("{field} is required")));
        }
    }

    connection
        .query_one(
            "INSERT INTO contact_message (name, email, message, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id, name, email, message, created_at",
            params![
                new_message.name.trim(),
                new_message.email.trim(),
                new_message.message.trim(),
                OffsetDateTime::now_utc(),
            ],
            map_row_to_contact_message,
        )
        .map_err(Error::from)
}

/// Get every contact message, oldest first.
pub fn get_contact_messages(connection: &Connection) -> Result<Vec<ContactMessage>, Error> {
    connection
        .prepare(
            "SELECT id, name, email, message, created_at FROM contact_message ORDER BY id ASC",
        )?
        .query_map([], map_row_to_contact_message)?
        .map(|row| row.map_err(Error::from))
        .collect()
}

/// Delete the contact message with the ID `id`.
///
/// # Errors
/// Returns [Error::ContactNotFound] if there is no such message.
pub fn delete_contact_message(id: DatabaseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM contact_message WHERE id = ?1", params![id])?;

    if rows_affected == 0 {
        return Err(Error::ContactNotFound);
    }

    Ok(())
}
