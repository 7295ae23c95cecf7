//! Backend dispatch transport.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the backend's base URL
//! - Strip hop-by-hop headers in both directions
//! - Enforce connect and response-header timeouts
//! - Map upstream failures to 502/504
//!
//! # Design Decisions
//! - One pooled client shared by every backend and every published table
//! - The response body is streamed back without buffering

use std::error::Error as StdError;
use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, Response, Uri, Version};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::http::response;
use crate::routing::handler::BackendTarget;

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::UPGRADE,
];

/// Errors raised while forwarding a request upstream.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("backend timed out after {0:?}")]
    Timeout(Duration),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("invalid upstream URI: {0}")]
    InvalidUri(String),
}

impl ForwardError {
    /// The response a client sees for this failure.
    pub fn to_response(&self) -> Response<Body> {
        match self {
            ForwardError::Timeout(_) => response::gateway_timeout(),
            ForwardError::Upstream(e) if is_timeout(e) => response::gateway_timeout(),
            _ => response::bad_gateway(),
        }
    }
}

/// Forwards requests to backends.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    header_timeout: Duration,
}

impl Forwarder {
    pub fn new(connect_timeout: Duration, header_timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(connect_timeout));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            header_timeout,
        }
    }

    /// Send `request` to `target` and stream back its response.
    pub async fn forward(
        &self,
        target: &BackendTarget,
        request: Request<Body>,
    ) -> Result<Response<Body>, ForwardError> {
        let (mut parts, body) = request.into_parts();

        let client_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        let uri = upstream_uri(target, &parts.uri)?;
        let authority = uri
            .authority()
            .map(|a| a.as_str().to_string())
            .unwrap_or_default();

        strip_hop_by_hop(&mut parts.headers);
        if let Some(host) = parts.headers.remove(header::HOST) {
            parts.headers.insert(X_FORWARDED_HOST, host);
        }
        if let Ok(host) = HeaderValue::from_str(&authority) {
            parts.headers.insert(header::HOST, host);
        }
        if let Some(ip) = client_addr {
            append_forwarded_for(&mut parts.headers, &ip.to_string());
        }
        parts.uri = uri;
        // Backends speak HTTP/1.1 regardless of the client's protocol.
        parts.version = Version::HTTP_11;

        let upstream = Request::from_parts(parts, body);
        let response = tokio::time::timeout(self.header_timeout, self.client.request(upstream))
            .await
            .map_err(|_| ForwardError::Timeout(self.header_timeout))??;

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// Join the backend base URL with the request path and query.
fn upstream_uri(target: &BackendTarget, original: &Uri) -> Result<Uri, ForwardError> {
    let base = &target.base_url;
    let host = base
        .host_str()
        .ok_or_else(|| ForwardError::InvalidUri(format!("backend {} has no host", target.id)))?;

    let mut uri = format!("{}://{}", base.scheme(), host);
    if let Some(port) = base.port() {
        uri.push_str(&format!(":{}", port));
    }
    uri.push_str(base.path().trim_end_matches('/'));
    uri.push_str(original.path());

    let query = match (base.query(), original.query()) {
        (Some(a), Some(b)) if !a.is_empty() => Some(format!("{}&{}", a, b)),
        (Some(a), None) => Some(a.to_string()),
        (_, Some(b)) => Some(b.to_string()),
        (None, None) => None,
    };
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        uri.push('?');
        uri.push_str(&query);
    }

    uri.parse()
        .map_err(|e: axum::http::uri::InvalidUri| ForwardError::InvalidUri(e.to_string()))
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

fn append_forwarded_for(headers: &mut HeaderMap, ip: &str) {
    let value = match headers.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        Some(prior) => format!("{}, {}", prior, ip),
        None => ip.to_string(),
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}

/// Whether any error in the source chain is an I/O timeout.
fn is_timeout(error: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(error);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::TimedOut {
                return true;
            }
        }
        current = e.source();
    }
    false
}
