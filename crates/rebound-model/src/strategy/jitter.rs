use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{ModelError, ModelResult};

/// Controls how random jitter is applied to backoff delays.
///
/// Jitter is used to distribute retries over time, preventing synchronized “retry storms” when many clients fail simultaneously.
/// Different strategies provide different trade-offs between predictability and collision avoidance.
///
/// Strategies (with `v = min(cap, base * 2^attempts)`):
/// - `NoJitter`: No jitter. The delay is exactly `v`.
/// - `FullJitter`: Full jitter, picks a random delay in `[0, v)`.
/// - `EqualJitter`: Equal jitter, picks a delay in `[v/2, v)`.
/// - `DecorrJitter`: Decorrelated jitter, picks `min(cap, base + rand(last * 3 - base))`.
///
/// The exact math is implemented by the core calculator. This enum only specifies the policy.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JitterStrategy {
    /// No randomness applied. Delays grow deterministically.
    NoJitter,
    /// Full jitter: delay is uniformly sampled from `[0, v)`.
    ///
    /// This is the most collision-resistant strategy.
    #[default]
    FullJitter,
    /// Equal jitter: half of the delay is fixed, the other half is sampled.
    EqualJitter,
    /// Decorrelated jitter: delay is derived from the previous delay rather than the attempt number.
    DecorrJitter,
}

impl JitterStrategy {
    /// All strategies, in declaration order.
    pub const ALL: [JitterStrategy; 4] = [
        JitterStrategy::NoJitter,
        JitterStrategy::FullJitter,
        JitterStrategy::EqualJitter,
        JitterStrategy::DecorrJitter,
    ];

    /// Return label value for logs and metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            JitterStrategy::NoJitter => "none",
            JitterStrategy::FullJitter => "full",
            JitterStrategy::EqualJitter => "equal",
            JitterStrategy::DecorrJitter => "decorrelated",
        }
    }
}

impl FromStr for JitterStrategy {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "no-jitter" | "nojitter" => Ok(JitterStrategy::NoJitter),
            "full" | "full-jitter" | "fulljitter" => Ok(JitterStrategy::FullJitter),
            "equal" | "equal-jitter" | "equaljitter" => Ok(JitterStrategy::EqualJitter),
            "decorrelated" | "decorr" | "decorr-jitter" | "decorrjitter" => {
                Ok(JitterStrategy::DecorrJitter)
            }
            other => Err(ModelError::UnknownJitter(other.to_string())),
        }
    }
}

impl fmt::Display for JitterStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

impl Serialize for JitterStrategy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_label())
    }
}

impl<'de> Deserialize<'de> for JitterStrategy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
