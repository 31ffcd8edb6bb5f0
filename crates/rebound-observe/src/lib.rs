//! Logging setup shared by rebound binaries.
//!
//! Library crates only emit `tracing` events; binaries call [`init_logger`] once at startup.
mod logger;
pub use logger::*;
