//! Application router configuration.

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::{
    AppState,
    account::{create_account_endpoint, get_account_endpoint},
    contact::{create_contact_endpoint, delete_contact_endpoint, list_contacts_endpoint},
    endpoints,
    ledger::{get_passbook_endpoint, update_amount_endpoint},
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ACCOUNTS, post(create_account_endpoint))
        .route(endpoints::ACCOUNT, get(get_account_endpoint))
        .route(endpoints::UPDATE_AMOUNT, put(update_amount_endpoint))
        .route(endpoints::PASSBOOK, get(get_passbook_endpoint))
        .route(
            endpoints::CONTACTS,
            post(create_contact_endpoint).get(list_contacts_endpoint),
        )
        .route(endpoints::CONTACT, delete(delete_contact_endpoint))
        .fallback(get_404_not_found)
        .with_state(state)
}
