//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via tracing; level from config, `RUST_LOG` override.
//! - Request IDs flow from the middleware through the header rewrite to the
//!   upstream and back onto the response.
//! - Metrics are cheap atomic updates; the Prometheus exporter is optional.

pub mod logging;
pub mod metrics;
