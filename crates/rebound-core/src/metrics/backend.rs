use std::sync::Arc;

/// Backend metrics collection interface.
///
/// Labels are bounded: `category` comes from [`rebound_model::BackoffCategory::as_label`]
/// and `jitter` from [`rebound_model::JitterStrategy::as_label`].
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record one computed delay.
    ///
    /// # Arguments
    /// - `category`: Failure category the sequence backs off for
    /// - `jitter`: Jitter strategy of the sequence
    /// - `delay_ms`: Returned delay in milliseconds
    /// - `clamped`: Whether the caller's maximum delay cut the value
    fn record_backoff(&self, category: &str, jitter: &str, delay_ms: u64, clamped: bool);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
