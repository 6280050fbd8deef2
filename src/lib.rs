//! xrelay - A CORS-unlocking HTTP forwarding relay
//!
//! This crate provides a relay server that:
//! - Forwards `<prefix><target-url>` requests to the target origin
//! - Follows redirects itself, up to a configurable limit
//! - Rewrites response headers so browser callers can read cross-origin responses
//! - Answers CORS preflights directly

// Re-export public modules with explicit visibility controls
pub mod config;
pub mod metrics;
pub mod ports;
pub mod tracing_setup;

// These modules are implementation details and should not be directly used by users
pub(crate) mod adapters;
pub(crate) mod core;
pub(crate) mod utils;

// Re-export the specific types needed by the binary crate and integration tests
pub use crate::adapters::{HyperHttpClient, RelayHandler, RelayServer, build_router};
pub use crate::core::{Forwarder, RelayError, RequestTranslator};
pub use crate::utils::graceful_shutdown::{GracefulShutdown, ShutdownReason};
