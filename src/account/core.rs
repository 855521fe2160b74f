//! Defines the account model and the database queries for reading accounts.

use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use time_tz::Tz;

use crate::{
    Error,
    database_id::DatabaseId,
    ledger::{Transaction, get_transactions},
};

/// A customer's bank account and its passbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// The database ID of the account, never shown to clients.
    #[serde(skip)]
    pub id: DatabaseId,
    /// The unique account number.
    pub account_number: String,
    /// The account holder's name.
    pub name: String,
    /// The account holder's email address.
    pub email: String,
    /// The account holder's phone number.
    pub phone: String,
    /// The account holder's Aadhaar card number.
    pub aadhar_card: String,
    /// The current balance.
    ///
    /// Always equal to the `new_total_amount` of the last transaction, or zero
    /// if there are no transactions.
    pub total_amount: f64,
    /// Every transaction applied to the account, oldest first.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Account {
    /// Express the transaction dates in `timezone`.
    pub fn in_timezone(mut self, timezone: &Tz) -> Self {
        self.transactions = self
            .transactions
            .into_iter()
            .map(|transaction| transaction.in_timezone(timezone))
            .collect();
        self
    }
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            account_number TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT NOT NULL,
            aadhar_card TEXT NOT NULL,
            total_amount REAL NOT NULL DEFAULT 0 CHECK (total_amount >= 0)
        )",
        (),
    )?;

    Ok(())
}

/// Map a row from the account table to an [Account] with an empty transaction list.
pub fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        account_number: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        aadhar_card: row.get(5)?,
        total_amount: row.get(6)?,
        transactions: Vec::new(),
    })
}

/// Get the account details without its transactions.
///
/// Returns `Ok(None)` if there is no account with `account_number`.
pub(crate) fn find_account(
    account_number: &str,
    connection: &Connection,
) -> Result<Option<Account>, Error> {
    connection
        .query_one(
            "SELECT id, account_number, name, email, phone, aadhar_card, total_amount
            FROM account WHERE account_number = ?1",
            params![account_number],
            map_row_to_account,
        )
        .optional()
        .map_err(Error::from)
}

/// Get an account and its full transaction history.
///
/// # Errors
/// Returns [Error::AccountNotFound] if there is no account with
/// `account_number`, or [Error::SqlError] if there is some other SQL error.
pub fn get_account(account_number: &str, connection: &Connection) -> Result<Account, Error> {
    let mut account = find_account(account_number, connection)?.ok_or(Error::AccountNotFound)?;
    account.transactions = get_transactions(account.id, connection)?;

    Ok(account)
}
