//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, request ID, access trace)
//!     → Router::serve (table lookup, fault boundary)
//!     → response.rs (synthetic 404/410/503/redirect)
//!       or forward.rs (stream to backend and back)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use forward::{ForwardError, Forwarder};
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::HttpServer;
