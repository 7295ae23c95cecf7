//! Route compilation.
//!
//! # Responsibilities
//! - Resolve backend records into dispatch targets
//! - Turn each route and redirect into a table entry
//! - Skip (with a warning) anything that cannot be resolved
//!
//! # Design Decisions
//! - Two synthetic backends, `gone` and `unavailable`, always exist
//! - A disabled route is always `unavailable`
//! - Redirects compile as document type `redirect` regardless of their item
//! - A store fault aborts the whole pass; the caller never sees a partial table

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::StreamExt;
use percent_encoding::percent_decode_str;
use thiserror::Error;
use url::Url;

use crate::routing::handler::{BackendTarget, Handler, Redirect};
use crate::routing::table::{MatchKind, RouteTable};
use crate::store::{RouteRecord, StoreError, StoreSession};

pub const GONE_BACKEND: &str = "gone";
pub const UNAVAILABLE_BACKEND: &str = "unavailable";

const DOCUMENT_TYPE_BOOM: &str = "boom";
const DOCUMENT_TYPE_GONE: &str = "gone";
const DOCUMENT_TYPE_REDIRECT: &str = "redirect";

/// Why a stored route path could not be decoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoutePathError {
    #[error("invalid percent-escape at byte {0}")]
    InvalidEscape(usize),

    #[error("invalid control character in path")]
    ControlCharacter,

    #[error("decoded path is not valid UTF-8")]
    InvalidUtf8,
}

/// Backend identifier → dispatch handler, including the synthetic backends.
pub type BackendMap = HashMap<String, Handler>;

/// Build a fresh table from everything the session yields.
pub async fn compile(session: &mut dyn StoreSession) -> Result<RouteTable, StoreError> {
    let backends = load_backends(session).await?;
    tracing::info!(count = backends.len(), "Loaded backends");

    let mut table = RouteTable::new();
    let mut items = session.content_items();
    while let Some(item) = items.next().await {
        let item = item?;
        for route in &item.routes {
            compile_route(
                route,
                &item.document_type,
                &item.rendering_app,
                &mut table,
                &backends,
            );
        }
        for redirect in &item.redirects {
            compile_route(
                redirect,
                DOCUMENT_TYPE_REDIRECT,
                &item.rendering_app,
                &mut table,
                &backends,
            );
        }
    }

    Ok(table)
}

/// Resolve every backend record, then add the synthetic backends.
pub async fn load_backends(session: &mut dyn StoreSession) -> Result<BackendMap, StoreError> {
    let mut backends = BackendMap::new();
    let mut records = session.backends();

    while let Some(record) = records.next().await {
        let record = record?;
        match Url::parse(&record.backend_url) {
            Ok(base_url) => {
                let target = BackendTarget {
                    id: record.backend_id.clone(),
                    base_url,
                };
                backends.insert(record.backend_id, Handler::Backend(Arc::new(target)));
            }
            Err(e) => {
                tracing::warn!(
                    backend_id = %record.backend_id,
                    backend_url = %record.backend_url,
                    error = %e,
                    "Couldn't parse backend URL, skipping"
                );
            }
        }
    }

    backends.insert(GONE_BACKEND.to_string(), Handler::Gone);
    backends.insert(UNAVAILABLE_BACKEND.to_string(), Handler::Unavailable);
    Ok(backends)
}

/// Compile one route into `table`, or log why it was skipped.
pub fn compile_route(
    route: &RouteRecord,
    document_type: &str,
    rendering_app: &str,
    table: &mut RouteTable,
    backends: &BackendMap,
) {
    let kind = if route.route_type == "prefix" {
        MatchKind::Prefix
    } else {
        MatchKind::Exact
    };

    let path = match decode_route_path(&route.path) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!(path = %route.path, error = %e, "Found route with invalid path, skipping");
            return;
        }
    };

    if route.disabled {
        tracing::debug!(path = %path, %kind, "Registered disabled route -> unavailable");
        table.insert(&path, kind, Handler::Unavailable);
        return;
    }

    let handler = match document_type {
        DOCUMENT_TYPE_BOOM => Handler::Boom,
        DOCUMENT_TYPE_GONE => Handler::Gone,
        DOCUMENT_TYPE_REDIRECT => Handler::Redirect(Arc::new(Redirect {
            source: path.clone(),
            destination: route.destination.clone(),
            preserve_segments: should_preserve_segments(route),
            temporary: route.redirect_type == "temporary",
        })),
        _ => match backends.get(rendering_app) {
            Some(handler) => handler.clone(),
            None => {
                tracing::warn!(
                    path = %path,
                    rendering_app = %rendering_app,
                    "Found route referencing unknown rendering app, skipping"
                );
                return;
            }
        },
    };

    tracing::debug!(path = %path, %kind, handler = %handler, "Registered route");
    table.insert(&path, kind, handler);
}

/// Whether a redirect appends the unmatched remainder and query string.
pub fn should_preserve_segments(route: &RouteRecord) -> bool {
    match (route.route_type.as_str(), route.segments_mode.as_str()) {
        ("exact", "preserve") => true,
        ("exact", _) => false,
        ("prefix", "ignore") => false,
        ("prefix", _) => true,
        _ => false,
    }
}

/// Decode a stored, percent-encoded route path.
///
/// Anything after `?` or `#` is not part of the path and is dropped.
pub fn decode_route_path(raw: &str) -> Result<String, RoutePathError> {
    let end = raw.find(&['?', '#'][..]).unwrap_or(raw.len());
    let raw = &raw[..end];

    let bytes = raw.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b.is_ascii_control() {
            return Err(RoutePathError::ControlCharacter);
        }
        if b == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .map(|hex| hex.iter().all(u8::is_ascii_hexdigit))
                .unwrap_or(false);
            if !valid {
                return Err(RoutePathError::InvalidEscape(i));
            }
        }
    }

    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| RoutePathError::InvalidUtf8)
}
