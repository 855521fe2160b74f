mod core;
mod create_endpoint;
mod get_endpoint;

pub(crate) use self::core::find_account;
pub use self::core::{Account, create_account_table, get_account};
pub use create_endpoint::{FIRST_ACCOUNT_NUMBER, NewAccount, create_account, create_account_endpoint};
pub use get_endpoint::get_account_endpoint;
