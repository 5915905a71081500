//! Error-to-response mapping.
//!
//! `InvalidInput` → 422, `NotFound` → 404, `Upstream` → 500. The body is the
//! error's plain-text message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::LookupError;

/// HTTP status for a lookup failure.
pub fn status_for(err: &LookupError) -> StatusCode {
    match err {
        LookupError::InvalidInput => StatusCode::UNPROCESSABLE_ENTITY,
        LookupError::NotFound => StatusCode::NOT_FOUND,
        LookupError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        (status_for(&self), self.to_string()).into_response()
    }
}
