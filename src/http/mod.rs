//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → forward.rs (target URL, header rewrite, upgrade check)
//!     → headers.rs (both rewrite directions)
//!     → websocket.rs (upgraded sessions) | upstream request
//!     → response.rs (assemble client response)
//! ```

pub mod forward;
pub mod headers;
pub mod request_id;
pub mod response;
pub mod server;
pub mod websocket;

pub use server::{AppState, HttpServer};
