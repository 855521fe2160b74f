//! Sets up the application's SQLite database.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, account::create_account_table, contact::create_contact_table,
    ledger::create_transaction_table,
};

/// Create the tables for the domain models if they do not exist yet.
///
/// Also turns on foreign key enforcement, which SQLite leaves off by default.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_account_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_contact_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
