//! Messages left through the contact form. Unrelated to accounts.

mod core;
mod endpoints;

pub use self::core::{ContactMessage, NewContactMessage, create_contact_table};
pub use endpoints::{create_contact_endpoint, delete_contact_endpoint, list_contacts_endpoint};
