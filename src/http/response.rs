//! Synthetic responses produced by the router itself.
//!
//! # Design Decisions
//! - Bodies are short plain text; only the status codes matter to clients
//! - Redirects carry a 30 minute public cache lifetime (`Cache-Control` and `Expires`)
//! - Non-ASCII bytes in a redirect target are percent-escaped

use std::time::{Duration, SystemTime};

use axum::body::Body;
use axum::http::{header, HeaderValue, Response, StatusCode};
use percent_encoding::{utf8_percent_encode, CONTROLS};

use crate::routing::handler::Redirect;

const REDIRECT_CACHE_CONTROL: &str = "max-age=1800, public";
const REDIRECT_CACHE_LIFETIME: Duration = Duration::from_secs(1800);

fn text(status: StatusCode, body: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

pub fn not_found() -> Response<Body> {
    text(StatusCode::NOT_FOUND, "404 page not found\n")
}

pub fn gone() -> Response<Body> {
    text(StatusCode::GONE, "410 gone\n")
}

pub fn unavailable() -> Response<Body> {
    text(StatusCode::SERVICE_UNAVAILABLE, "503 Service Unavailable\n")
}

pub fn not_implemented() -> Response<Body> {
    text(StatusCode::NOT_IMPLEMENTED, "501 Not Implemented\n")
}

pub fn internal_error() -> Response<Body> {
    text(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error\n")
}

pub fn bad_gateway() -> Response<Body> {
    text(StatusCode::BAD_GATEWAY, "502 Bad Gateway\n")
}

pub fn gateway_timeout() -> Response<Body> {
    text(StatusCode::GATEWAY_TIMEOUT, "504 Gateway Timeout\n")
}

/// Build the redirect response for a request at `path` with raw `query`.
pub fn redirect(redirect: &Redirect, path: &str, query: Option<&str>) -> Response<Body> {
    let target = redirect.location(path, query);
    let location = utf8_percent_encode(&target, CONTROLS).to_string();

    let location = match HeaderValue::from_str(&location) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(target = %target, error = %e, "Redirect target is not a valid header value");
            return internal_error();
        }
    };

    let mut response = Response::new(Body::empty());
    *response.status_mut() = redirect.status();
    let headers = response.headers_mut();
    headers.insert(header::LOCATION, location);
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(REDIRECT_CACHE_CONTROL),
    );
    let expires = httpdate::fmt_http_date(SystemTime::now() + REDIRECT_CACHE_LIFETIME);
    if let Ok(value) = HeaderValue::from_str(&expires) {
        headers.insert(header::EXPIRES, value);
    }
    response
}
