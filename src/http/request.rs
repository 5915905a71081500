//! Request identification.
//!
//! # Responsibilities
//! - Generate a UUID v4 `x-request-id` when the caller did not send one
//! - Echo the id on the response
//! - Expose the id to handlers for log correlation
//!
//! # Design Decisions
//! - Request ID added as early as possible, before the trace layer opens its span

use axum::http::{HeaderMap, HeaderValue, Request};
use tower_http::request_id::{self, RequestId};
use uuid::Uuid;

/// Header carrying the request id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestId;

impl request_id::MakeRequestId for MakeRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request id from headers, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}
