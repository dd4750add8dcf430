//! Shared response payloads and helpers.

use salvo::http::StatusCode;
use salvo::{Depot, Response, writing::Json};
use serde::Serialize;

use crate::store_handler::{SharedStore, get_store_from_depot};

/// ## Summary
/// Error response payload
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn render_error(res: &mut Response, status: StatusCode, error: impl Into<String>) {
    res.status_code(status);
    res.render(Json(ErrorResponse {
        error: error.into(),
    }));
}

/// Fetches the shared store, answering 500 when it is missing.
pub fn obtain_store(depot: &Depot, res: &mut Response) -> Option<SharedStore> {
    match get_store_from_depot(depot) {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::error!(error = %e, "Failed to get attendance store");
            render_error(res, StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
            None
        }
    }
}

/// Reads a query parameter, treating an empty value as absent.
pub fn non_empty_query(req: &salvo::Request, key: &str) -> Option<String> {
    req.query::<String>(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
