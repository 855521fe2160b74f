//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/accounts/{account_number}', use [format_endpoint].

/// The route for opening an account.
pub const ACCOUNTS: &str = "/accounts";
/// The route for looking up a single account.
pub const ACCOUNT: &str = "/accounts/{account_number}";
/// The route for crediting or debiting an account.
pub const UPDATE_AMOUNT: &str = "/accounts/{account_number}/update-amount";
/// The route for an account's passbook.
pub const PASSBOOK: &str = "/accounts/{account_number}/transactions";
/// The route for creating and listing contact messages.
pub const CONTACTS: &str = "/contacts";
/// The route for deleting a contact message.
pub const CONTACT: &str = "/contacts/{contact_id}";

/// Replace the parameter in `endpoint_path` with `value`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/accounts/{account_number}', '{account_number}' is the parameter.
///
/// This function assumes that an endpoint path contains a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, value: impl std::fmt::Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        value,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ACCOUNTS);
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::ACCOUNT, 1));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::UPDATE_AMOUNT, 1));
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::PASSBOOK, 1));
        assert_endpoint_is_valid_uri(endpoints::CONTACTS);
        assert_endpoint_is_valid_uri(&format_endpoint(endpoints::CONTACT, 1));
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        let formatted_path = format_endpoint("/hello/{world}", "100000001");

        assert_eq!(formatted_path, "/hello/100000001");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/accounts/{account_number}/transactions", 42);

        assert_eq!(formatted_path, "/accounts/42/transactions");
    }
}
