//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router, compiler, transport
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty for development, JSON for production)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields rather than formatted messages
//! - Request ID appears on every fault record
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
