//! Defines the transaction model and the database queries for an account's ledger.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, OptionalExtension, Row, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time_tz::Tz;

use crate::{Error, database_id::DatabaseId, timezone::to_local_time};

/// Whether a transaction adds money to or takes money from an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money paid into the account.
    Credit,
    /// Money taken out of the account.
    Debit,
}

impl TransactionKind {
    /// The name used in JSON and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Credit => "credit",
            TransactionKind::Debit => "debit",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    /// Only the exact, lowercase names are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(TransactionKind::Credit),
            "debit" => Ok(TransactionKind::Debit),
            _ => Err(Error::InvalidKind),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A single entry in an account's passbook.
///
/// Transactions are never edited or removed once they have been recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// Credit or debit.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// How much money was moved, always greater than zero.
    pub amount: f64,
    /// The account balance straight after this transaction.
    pub new_total_amount: f64,
}

impl Transaction {
    /// Express the transaction date in `timezone`.
    pub fn in_timezone(self, timezone: &Tz) -> Self {
        Self {
            date: to_local_time(self.date, timezone),
            ..self
        }
    }
}

pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account_transaction (
            id INTEGER PRIMARY KEY,
            account_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('credit', 'debit')),
            amount REAL NOT NULL CHECK (amount > 0),
            new_total_amount REAL NOT NULL CHECK (new_total_amount >= 0),
            FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_account_transaction_account_id
        ON account_transaction(account_id)",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_transaction(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        date: row.get(0)?,
        kind: row.get(1)?,
        amount: row.get(2)?,
        new_total_amount: row.get(3)?,
    })
}

/// Get every transaction for the account with the database ID `account_id`,
/// in the order they were recorded.
pub fn get_transactions(
    account_id: DatabaseId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT date, kind, amount, new_total_amount FROM account_transaction
            WHERE account_id = ?1 ORDER BY id ASC",
        )?
        .query_map(params![account_id], map_row_to_transaction)?
        .map(|row| row.map_err(Error::from))
        .collect()
}

/// Get the date of the most recent transaction for an account, if any.
pub(crate) fn get_latest_transaction_date(
    account_id: DatabaseId,
    connection: &Connection,
) -> Result<Option<OffsetDateTime>, Error> {
    connection
        .query_one(
            "SELECT date FROM account_transaction
            WHERE account_id = ?1 ORDER BY id DESC LIMIT 1",
            params![account_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::from)
}

/// Append `transaction` to the ledger of the account with the database ID `account_id`.
///
/// Callers are responsible for updating the account balance in the same SQL transaction.
pub(crate) fn insert_transaction(
    account_id: DatabaseId,
    transaction: &Transaction,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO account_transaction (account_id, date, kind, amount, new_total_amount)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            account_id,
            transaction.date,
            transaction.kind,
            transaction.amount,
            transaction.new_total_amount,
        ],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        Error,
        account::{NewAccount, create_account},
        db::initialize,
    };

    use super::{
        Transaction, TransactionKind, create_transaction_table, get_latest_transaction_date,
        get_transactions, insert_transaction,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), create_transaction_table(&connection));
    }

    #[test]
    fn parses_exact_kind_names_only() {
        assert_eq!("credit".parse::<TransactionKind>(), Ok(TransactionKind::Credit));
        assert_eq!("debit".parse::<TransactionKind>(), Ok(TransactionKind::Debit));
        assert_eq!("Credit".parse::<TransactionKind>(), Err(Error::InvalidKind));
        assert_eq!("refund".parse::<TransactionKind>(), Err(Error::InvalidKind));
    }

    #[test]
    fn serializes_with_passbook_field_names() {
        let transaction = Transaction {
            date: datetime!(2024-06-01 12:00 UTC),
            kind: TransactionKind::Credit,
            amount: 200.0,
            new_total_amount: 1200.0,
        };

        let json = serde_json::to_value(&transaction).unwrap();

        assert_eq!(json["type"], "credit");
        assert_eq!(json["amount"], 200.0);
        assert_eq!(json["newTotalAmount"], 1200.0);
        assert_eq!(json["date"], "2024-06-01T12:00:00Z");
    }

    #[test]
    fn returns_transactions_in_insertion_order() {
        let conn = get_test_connection();
        let account = create_account(&NewAccount::named("Salman"), &conn).unwrap();
        let first = Transaction {
            date: datetime!(2024-06-01 12:00 UTC),
            kind: TransactionKind::Credit,
            amount: 100.0,
            new_total_amount: 100.0,
        };
        let second = Transaction {
            date: datetime!(2024-06-01 12:00 UTC),
            kind: TransactionKind::Debit,
            amount: 40.0,
            new_total_amount: 60.0,
        };
        insert_transaction(account.id, &first, &conn).unwrap();
        insert_transaction(account.id, &second, &conn).unwrap();

        let got = get_transactions(account.id, &conn).unwrap();

        assert_eq!(got, vec![first, second.clone()]);
        assert_eq!(
            get_latest_transaction_date(account.id, &conn),
            Ok(Some(second.date))
        );
    }

    #[test]
    fn latest_date_is_none_for_empty_ledger() {
        let conn = get_test_connection();
        let account = create_account(&NewAccount::named("Salman"), &conn).unwrap();

        assert_eq!(get_latest_transaction_date(account.id, &conn), Ok(None));
    }

    #[test]
    fn rejects_transaction_for_missing_account() {
        let conn = get_test_connection();
        let transaction = Transaction {
            date: datetime!(2024-06-01 12:00 UTC),
            kind: TransactionKind::Credit,
            amount: 100.0,
            new_total_amount: 100.0,
        };

        assert!(insert_transaction(999, &transaction, &conn).is_err());
    }
}
