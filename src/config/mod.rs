//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → CLI overrides applied (main.rs)
//!     → validation.rs (semantic checks, all errors reported)
//!     → ProxyConfig (immutable for the process lifetime)
//! ```
//!
//! # Design Decisions
//! - Config is fixed at startup; the upstream base URL never changes at
//!   runtime, so there is no reload machinery.
//! - All fields except the target base URL have defaults.
//! - Validation separates syntactic (serde) from semantic checks.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    ForwardingConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, TlsConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
