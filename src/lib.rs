//! Content router: a reverse-proxy routing core with hot-reloadable route tables.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod store;

pub use config::schema::RouterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{RouteStats, Router};
