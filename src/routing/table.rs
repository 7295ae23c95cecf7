//! Path trie multiplexer.
//!
//! # Responsibilities
//! - Store compiled entries keyed by `/`-delimited path segments
//! - Resolve a decoded request path to exactly one handler
//! - Summarize the insertion sequence as a count and a checksum
//!
//! # Design Decisions
//! - One trie level per path segment; empty segments are ignored
//! - Exact beats prefix at the same node
//! - Among prefix entries, the deepest ancestor of the request path wins
//! - Last insertion for a given (path, kind) wins; duplicates still count
//! - Built once, then shared immutably behind an `Arc`

use std::collections::HashMap;
use std::fmt;

use sha2::{Digest, Sha256};

use crate::routing::handler::Handler;

/// How an entry matches request paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// Only the identical path.
    Exact,
    /// The path and every descendant path.
    Prefix,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKind::Exact => f.write_str("exact"),
            MatchKind::Prefix => f.write_str("prefix"),
        }
    }
}

#[derive(Debug, Default)]
struct Node {
    children: HashMap<String, Node>,
    exact: Option<Handler>,
    prefix: Option<Handler>,
}

/// An immutable-once-published routing table.
#[derive(Debug)]
pub struct RouteTable {
    root: Node,
    count: usize,
    digest: Sha256,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            root: Node::default(),
            count: 0,
            digest: Sha256::new(),
        }
    }

    /// Register `handler` at `path`.
    pub fn insert(&mut self, path: &str, kind: MatchKind, handler: Handler) {
        self.count += 1;
        self.digest_field(path.as_bytes());
        self.digest_field(kind.to_string().as_bytes());
        self.digest_field(handler.identity().as_bytes());

        let mut node = &mut self.root;
        for segment in split_path(path) {
            node = node.children.entry(segment.to_string()).or_default();
        }

        match kind {
            MatchKind::Exact => node.exact = Some(handler),
            MatchKind::Prefix => node.prefix = Some(handler),
        }
    }

    /// Length-prefixed so no path contents can shift field boundaries.
    fn digest_field(&mut self, bytes: &[u8]) {
        self.digest.update((bytes.len() as u64).to_be_bytes());
        self.digest.update(bytes);
    }

    /// Find the handler for a decoded request path.
    pub fn lookup(&self, path: &str) -> Option<&Handler> {
        let mut node = &self.root;
        let mut fallback = node.prefix.as_ref();

        for segment in split_path(path) {
            match node.children.get(segment) {
                Some(child) => {
                    node = child;
                    if child.prefix.is_some() {
                        fallback = child.prefix.as_ref();
                    }
                }
                None => return fallback,
            }
        }

        node.exact.as_ref().or(fallback)
    }

    /// Number of `insert` calls made on this table.
    pub fn count(&self) -> usize {
        self.count
    }

    /// SHA-256 over the ordered (path, kind, handler identity) sequence.
    pub fn checksum(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.digest.clone().finalize());
        out
    }

    pub fn checksum_hex(&self) -> String {
        hex::encode(self.checksum())
    }
}

/// Split a path into its non-empty `/`-delimited segments.
pub fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::handler::{BackendTarget, Redirect};
    use std::sync::Arc;
    use url::Url;

    fn backend(id: &str) -> Handler {
        backend_at(id, "http://127.0.0.1:3000")
    }

    fn backend_at(id: &str, url: &str) -> Handler {
        Handler::Backend(Arc::new(BackendTarget {
            id: id.to_string(),
            base_url: Url::parse(url).unwrap(),
        }))
    }

    fn id(handler: Option<&Handler>) -> Option<String> {
        handler.map(|h| h.to_string())
    }

    #[test]
    fn exact_matches_only_identical_path() {
        let mut table = RouteTable::new();
        table.insert("/foo", MatchKind::Exact, backend("a"));

        assert_eq!(id(table.lookup("/foo")), Some("backend:a".into()));
        assert_eq!(id(table.lookup("/foo/bar")), None);
        assert_eq!(id(table.lookup("/fo")), None);
        assert_eq!(id(table.lookup("/")), None);
    }

    #[test]
    fn prefix_matches_path_and_descendants() {
        let mut table = RouteTable::new();
        table.insert("/foo", MatchKind::Prefix, backend("a"));

        assert_eq!(id(table.lookup("/foo")), Some("backend:a".into()));
        assert_eq!(id(table.lookup("/foo/bar/baz")), Some("backend:a".into()));
        assert_eq!(id(table.lookup("/foobar")), None);
        assert_eq!(id(table.lookup("/bar")), None);
    }

    #[test]
    fn exact_beats_prefix_at_same_path() {
        let mut table = RouteTable::new();
        table.insert("/foo", MatchKind::Prefix, backend("prefix"));
        table.insert("/foo", MatchKind::Exact, backend("exact"));

        assert_eq!(id(table.lookup("/foo")), Some("backend:exact".into()));
        assert_eq!(id(table.lookup("/foo/bar")), Some("backend:prefix".into()));
    }

    #[test]
    fn longest_prefix_wins() {
        let mut table = RouteTable::new();
        table.insert("/", MatchKind::Prefix, backend("root"));
        table.insert("/a", MatchKind::Prefix, backend("a"));
        table.insert("/a/b/c", MatchKind::Prefix, backend("abc"));

        assert_eq!(id(table.lookup("/a/b/c/d")), Some("backend:abc".into()));
        assert_eq!(id(table.lookup("/a/b")), Some("backend:a".into()));
        assert_eq!(id(table.lookup("/a/b/x")), Some("backend:a".into()));
        assert_eq!(id(table.lookup("/z")), Some("backend:root".into()));
        assert_eq!(id(table.lookup("/")), Some("backend:root".into()));
    }

    #[test]
    fn exact_deeper_than_walk_falls_back_to_prefix() {
        let mut table = RouteTable::new();
        table.insert("/a", MatchKind::Prefix, backend("a"));
        table.insert("/a/b/c", MatchKind::Exact, backend("abc"));

        // Node /a/b exists but carries no entry of its own.
        assert_eq!(id(table.lookup("/a/b")), Some("backend:a".into()));
        assert_eq!(id(table.lookup("/a/b/c")), Some("backend:abc".into()));
        assert_eq!(id(table.lookup("/a/b/c/d")), Some("backend:a".into()));
    }

    #[test]
    fn empty_segments_are_ignored() {
        let mut table = RouteTable::new();
        table.insert("/foo/bar", MatchKind::Exact, backend("a"));

        assert_eq!(id(table.lookup("/foo/bar/")), Some("backend:a".into()));
        assert_eq!(id(table.lookup("//foo//bar")), Some("backend:a".into()));
    }

    #[test]
    fn root_exact_entry() {
        let mut table = RouteTable::new();
        table.insert("/", MatchKind::Exact, backend("home"));

        assert_eq!(id(table.lookup("/")), Some("backend:home".into()));
        assert_eq!(id(table.lookup("")), Some("backend:home".into()));
        assert_eq!(id(table.lookup("/x")), None);
    }

    #[test]
    fn last_insert_wins_and_counts() {
        let mut table = RouteTable::new();
        table.insert("/foo", MatchKind::Exact, backend("first"));
        table.insert("/foo", MatchKind::Exact, backend("second"));

        assert_eq!(id(table.lookup("/foo")), Some("backend:second".into()));
        assert_eq!(table.count(), 2);
    }

    #[test]
    fn empty_table_matches_nothing() {
        let table = RouteTable::new();
        assert_eq!(table.count(), 0);
        assert!(table.lookup("/anything").is_none());
        assert_eq!(
            table.checksum_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    fn build(entries: &[(&str, MatchKind, Handler)]) -> RouteTable {
        let mut table = RouteTable::new();
        for (path, kind, handler) in entries {
            table.insert(path, *kind, handler.clone());
        }
        table
    }

    #[test]
    fn checksum_is_deterministic() {
        let entries = [
            ("/a", MatchKind::Exact, backend("x")),
            ("/b", MatchKind::Prefix, Handler::Gone),
        ];
        assert_eq!(build(&entries).checksum(), build(&entries).checksum());
    }

    #[test]
    fn checksum_changes_with_any_field_or_order() {
        let base = build(&[
            ("/a", MatchKind::Exact, backend("x")),
            ("/b", MatchKind::Prefix, Handler::Gone),
        ]);

        let variants = [
            build(&[
                ("/a2", MatchKind::Exact, backend("x")),
                ("/b", MatchKind::Prefix, Handler::Gone),
            ]),
            build(&[
                ("/a", MatchKind::Prefix, backend("x")),
                ("/b", MatchKind::Prefix, Handler::Gone),
            ]),
            build(&[
                ("/a", MatchKind::Exact, backend("y")),
                ("/b", MatchKind::Prefix, Handler::Gone),
            ]),
            build(&[
                ("/b", MatchKind::Prefix, Handler::Gone),
                ("/a", MatchKind::Exact, backend("x")),
            ]),
            build(&[
                ("/a", MatchKind::Exact, backend("x")),
                (
                    "/b",
                    MatchKind::Prefix,
                    Handler::Redirect(Arc::new(Redirect {
                        source: "/b".into(),
                        destination: "/c".into(),
                        preserve_segments: true,
                        temporary: false,
                    })),
                ),
            ]),
        ];

        for variant in &variants {
            assert_ne!(base.checksum(), variant.checksum());
        }
    }

    #[test]
    fn checksum_changes_with_backend_url() {
        let before = build(&[("/a", MatchKind::Prefix, backend_at("publisher", "http://10.0.0.1:3000"))]);
        let after = build(&[("/a", MatchKind::Prefix, backend_at("publisher", "http://10.9.9.9:4000"))]);

        assert_eq!(before.count(), after.count());
        assert_ne!(before.checksum(), after.checksum());
    }

    #[test]
    fn newline_in_path_cannot_forge_entry_boundaries() {
        let joined = build(&[("/a(exact) -> gone\n/b", MatchKind::Exact, Handler::Gone)]);
        let split = build(&[
            ("/a", MatchKind::Exact, Handler::Gone),
            ("/b", MatchKind::Exact, Handler::Gone),
        ]);
        assert_ne!(joined.checksum(), split.checksum());
    }
}
