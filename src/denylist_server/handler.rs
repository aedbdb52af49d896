//! Deny list handler.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use log::error;

use super::DenylistState;
use crate::config::STORE_READ_ERROR_LINE;
use crate::error_handling::FailureType;

/// Serves the current store contents as nginx `deny` directives.
///
/// Always answers 200 with `text/plain`. If the store cannot be read the body
/// is a single `#` comment line instead of the list.
pub async fn deny_list_handler(State(state): State<DenylistState>) -> Response {
    let body = match state.store.list_keys().await {
        Ok(keys) => render_deny_list(&keys),
        Err(e) => {
            error!("Failed to read exit nodes from the store: {e}");
            state.stats.increment_failure(FailureType::StoreRead);
            format!("{STORE_READ_ERROR_LINE}\n")
        }
    };

    ([(header::CONTENT_TYPE, "text/plain")], body).into_response()
}

/// Renders one `deny <ip>;` line per key, preserving order.
pub fn render_deny_list(keys: &[String]) -> String {
    let mut body = String::with_capacity(keys.len() * 24);
    for ip in keys {
        body.push_str("deny ");
        body.push_str(ip);
        body.push_str(";\n");
    }
    body
}
