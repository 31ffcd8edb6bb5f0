//! Prometheus metrics backend for rebound backoff sequences.
//!
//! [`PrometheusMetrics`] implements [`rebound_core::MetricsBackend`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use rebound_core::BackoffTable;
//! use rebound_model::BackoffCategory;
//! use rebound_prometheus::{Encoder, PrometheusMetrics, TextEncoder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let mut seq = BackoffTable::default().sequence(BackoffCategory::PdRpc, Arc::new(metrics.clone()));
//! let _delay = seq.next_delay_ms(0);
//!
//! let mut buf = Vec::new();
//! TextEncoder::new().encode(&metrics.gather(), &mut buf)?;
//! assert!(String::from_utf8(buf)?.contains("rebound_backoff_total"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `rebound_backoff_total{category, jitter}` - Counter
//! - `rebound_backoff_clamped_total{category}` - Counter
//! - `rebound_backoff_delay_seconds{category}` - Histogram
//!
//! Serving `/metrics` is left to the application's HTTP stack.

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
