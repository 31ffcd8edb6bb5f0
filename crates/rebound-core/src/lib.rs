pub mod backoff;
pub mod error;
pub mod metrics;
pub mod table;

pub use backoff::{BackoffFunction, RandomHandle, RandomSource, SeededRandom, ThreadRandom};
pub use metrics::{MetricsBackend, MetricsHandle, NoOpMetrics, noop_metrics};
pub use table::{BackoffTable, CategoryBackoff};

pub mod prelude {
    pub use crate::backoff::{BackoffFunction, RandomSource};
    pub use crate::error::CoreError;
    pub use crate::table::{BackoffTable, CategoryBackoff};
    pub use rebound_model::{BackoffCategory, BackoffStrategy, JitterStrategy};
}
