//! Compiled route handlers.
//!
//! Every route is resolved to one of these variants when the table is built,
//! so request-time dispatch is a plain `match`.

use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;
use url::Url;

/// A resolved upstream application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendTarget {
    pub id: String,
    pub base_url: Url,
}

/// Redirect behavior for one registered path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// The decoded path the redirect was registered at.
    pub source: String,
    pub destination: String,
    /// Append the unmatched remainder and query string to `destination`.
    pub preserve_segments: bool,
    pub temporary: bool,
}

impl Redirect {
    pub fn status(&self) -> StatusCode {
        if self.temporary {
            StatusCode::FOUND
        } else {
            StatusCode::MOVED_PERMANENTLY
        }
    }

    /// Compute the `Location` for a request, given its decoded path and raw query.
    pub fn location(&self, request_path: &str, query: Option<&str>) -> String {
        if !self.preserve_segments {
            return self.destination.clone();
        }

        let remainder = request_path
            .strip_prefix(self.source.as_str())
            .unwrap_or(request_path);
        let mut target = format!("{}{}", self.destination, remainder);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            target.push('?');
            target.push_str(query);
        }
        target
    }
}

/// What a table entry does when matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handler {
    /// Forward to an upstream application.
    Backend(Arc<BackendTarget>),
    /// Always 410.
    Gone,
    /// Always 503.
    Unavailable,
    Redirect(Arc<Redirect>),
    /// Faults on every request; exercises the request fault boundary.
    Boom,
}

impl Handler {
    /// Identity fed to the table checksum. Covers everything that affects
    /// dispatch, including a backend's base URL.
    pub fn identity(&self) -> String {
        match self {
            Handler::Backend(target) => format!("backend:{}={}", target.id, target.base_url),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Handler {
    /// Short label for logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Backend(target) => write!(f, "backend:{}", target.id),
            Handler::Gone => f.write_str("gone"),
            Handler::Unavailable => f.write_str("unavailable"),
            Handler::Redirect(r) => write!(
                f,
                "redirect:{}:{}:{}",
                r.status().as_u16(),
                r.destination,
                if r.preserve_segments { "preserve" } else { "ignore" }
            ),
            Handler::Boom => f.write_str("boom"),
        }
    }
}
