use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// The `(base, cap, jitter)` triple a retry sequence is built from.
///
/// `base_ms` is the first delay unit, `cap_ms` the ceiling no delay may exceed.
/// A zero triple (`base_ms = cap_ms = 0`) is valid and always yields a zero delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackoffStrategy {
    pub base_ms: u64,
    pub cap_ms: u64,
    #[serde(default)]
    pub jitter: super::JitterStrategy,
}

impl BackoffStrategy {
    /// Convenience constructor.
    pub const fn new(base_ms: u64, cap_ms: u64, jitter: super::JitterStrategy) -> Self {
        Self {
            base_ms,
            cap_ms,
            jitter,
        }
    }

    /// Checks construction-time preconditions.
    ///
    /// The ceiling must not be lower than the base unit.
    pub fn validate(&self) -> ModelResult<()> {
        if self.cap_ms < self.base_ms {
            return Err(ModelError::Invalid(format!(
                "capMs ({}) must not be lower than baseMs ({})",
                self.cap_ms, self.base_ms
            )));
        }
        Ok(())
    }
}
