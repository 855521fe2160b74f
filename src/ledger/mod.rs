//! The account ledger: crediting and debiting accounts and reading passbooks.

mod core;
mod passbook;
mod update_endpoint;

pub use self::core::{Transaction, TransactionKind, create_transaction_table, get_transactions};
pub use passbook::{get_passbook, get_passbook_endpoint};
pub use update_endpoint::{AmountUpdate, update_amount, update_amount_endpoint};
