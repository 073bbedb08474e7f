//! Upstream subsystem: the one origin requests are forwarded to.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → target.rs (base + path + query → absolute target URL)
//!     → client.rs (pool slot, HTTP client, timeout budget)
//!     → buffered upstream response back to the HTTP layer
//! ```
//!
//! # Design Decisions
//! - One upstream for the process lifetime; no routing, no balancing.
//! - The semaphore in `client.rs` is the only outbound backpressure; there
//!   is no bound on request or response body size.
//! - The handle is passed explicitly through application state, never held
//!   in a global.

pub mod client;
pub mod target;

pub use client::{Upstream, UpstreamInitError};
pub use target::resolve_target_url;
