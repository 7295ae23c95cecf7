//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Reload:
//!     RouteStore session
//!     → compiler.rs (resolve backends, compile routes and redirects)
//!     → table.rs (fresh trie, count, checksum)
//!     → router.rs (atomic publish)
//!
//! Request:
//!     router.rs (snapshot published table)
//!     → table.rs (exact, else longest prefix)
//!     → handler.rs variant (backend / gone / unavailable / redirect / boom)
//! ```
//!
//! # Design Decisions
//! - Tables are compiled off the request path and immutable once published
//! - No regex; lookup cost is one hash probe per path segment
//! - Deterministic: same store contents always yield the same table and checksum

pub mod compiler;
pub mod handler;
pub mod router;
pub mod table;

pub use handler::{BackendTarget, Handler, Redirect};
pub use router::{ReloadError, RouteStats, Router};
pub use table::{MatchKind, RouteTable};
