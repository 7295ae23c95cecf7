//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Logging/metrics → Router → Initial reload → Triggers → Listeners
//!
//! Reload triggers (signals.rs, config/watcher.rs, admin POST /reload):
//!     SIGHUP / store file change → reload channel → Router::reload
//!
//! Shutdown (shutdown.rs):
//!     Ctrl-C → broadcast → listeners drain → exit
//! ```
//!
//! # Design Decisions
//! - A failed initial reload is not fatal; the router serves 404s until a
//!   later reload succeeds
//! - Listeners start last (traffic only once the first reload was attempted)

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
