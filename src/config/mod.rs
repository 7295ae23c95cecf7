//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!
//! Route store file change:
//!     watcher.rs detects change
//!     → reload trigger sent
//!     → Router::reload rebuilds and publishes a new table
//! ```
//!
//! # Design Decisions
//! - Process config is immutable once loaded; only the route table reloads
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, ListenerConfig, LogFormat, ObservabilityConfig, RouterConfig, StoreConfig,
    TimeoutConfig,
};
