//! HTTP server for the tournament hub.
//!
//! The binary in `main.rs` wires configuration, logging, metrics and storage
//! together; the router itself lives in [`api`] so it can be driven directly
//! in tests.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
