//! Single-upstream reverse HTTP/WebSocket proxy.
//!
//! Accepts arbitrary client requests on one listening port and forwards them
//! to one configured upstream origin, relaying both plain request/response
//! exchanges and upgraded WebSocket sessions.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                    PROXY                     │
//!   Client Request   │  ┌────────┐   ┌─────────┐   ┌────────────┐  │
//!   ─────────────────┼─▶│  http  │──▶│ forward │──▶│  upstream  │──┼──▶ Upstream
//!                    │  │ server │   │ +headers│   │client +pool│  │     Origin
//!                    │  └────────┘   └────┬────┘   └────────────┘  │
//!                    │                    │ upgrade?               │
//!                    │                    ▼                        │
//!                    │              ┌───────────┐                  │
//!   WebSocket frames │              │ websocket │                  │
//!   ◀────────────────┼─────────────▶│   relay   │◀─────────────────┼──▶ frames
//!                    │              └───────────┘                  │
//!                    │  ┌─────────────────────────────────────────┐│
//!                    │  │ config · lifecycle · observability      ││
//!                    │  └─────────────────────────────────────────┘│
//!                    └──────────────────────────────────────────────┘
//! ```
//!
//! # Design Notes
//!
//! - Bodies are fully buffered in both directions; memory is bounded by the
//!   largest single body in flight. This is a deliberate trade-off, not a
//!   defect: there is no streaming and no backpressure on body size.
//! - The upstream connection pool (`upstream.max_conn`) is the only
//!   backpressure on outbound traffic.
//! - Every forward attempt is single-shot; all upstream failures collapse
//!   into one 502 response.

// Core subsystems
pub mod config;
pub mod error;
pub mod http;
pub mod upstream;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ProxyConfig;
pub use error::UpstreamError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use upstream::Upstream;
