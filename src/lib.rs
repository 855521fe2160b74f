//! Passbook is a small banking ledger served as a JSON REST API.
//!
//! Accounts hold a balance that changes only through credit and debit
//! transactions. Every transaction is recorded in the account's passbook
//! together with the balance straight after it was applied.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod account;
mod app_state;
mod contact;
mod database_id;
mod db;
mod endpoints;
mod error;
mod ledger;
mod logging;
mod not_found;
mod routing;
mod timezone;

pub use account::{Account, FIRST_ACCOUNT_NUMBER, NewAccount, create_account, get_account};
pub use app_state::AppState;
pub use contact::{ContactMessage, NewContactMessage};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use ledger::{AmountUpdate, Transaction, TransactionKind, get_passbook, update_amount};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
