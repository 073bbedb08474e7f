//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Parse CLI → load config → validate → init logging/metrics → serve
//!
//! Shutdown:
//!     SIGTERM/SIGINT (signals.rs) → Shutdown::trigger (shutdown.rs)
//!     → listener drains → upstream handle dropped → exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::spawn_signal_listener;
