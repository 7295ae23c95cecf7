//! Request identification.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every incoming request
//! - Read the ID back for fault records and access logs
//!
//! # Design Decisions
//! - A client-supplied `x-request-id` is kept, not replaced
//! - The ID is echoed on the response for correlation

use axum::http::{HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request's ID, or `"unknown"` when none was assigned.
pub fn request_id<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}
