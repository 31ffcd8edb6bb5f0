//! Failure category to backoff configuration mapping.
//!
//! [`BackoffTable`] holds one [`BackoffStrategy`] per [`BackoffCategory`]. It starts from
//! built-in defaults and can be overridden from JSON. Retry sequences are started from the
//! table with [`BackoffTable::create`] or [`BackoffTable::sequence`].
mod sequence;
pub use sequence::CategoryBackoff;

use std::{collections::BTreeMap, fs, path::Path};

use serde::Serialize;
use tracing::debug;

use rebound_model::{BackoffCategory, BackoffStrategy, JitterStrategy};

use crate::backoff::{BackoffFunction, RandomSource};
use crate::error::{CoreError, CoreResult};
use crate::metrics::MetricsHandle;

/// Built-in configuration for a category.
pub const fn default_strategy(category: BackoffCategory) -> BackoffStrategy {
    use JitterStrategy::{EqualJitter, NoJitter};
    match category {
        BackoffCategory::TikvRpc => BackoffStrategy::new(100, 2_000, EqualJitter),
        BackoffCategory::TxnLock => BackoffStrategy::new(200, 3_000, EqualJitter),
        BackoffCategory::TxnLockFast => BackoffStrategy::new(100, 3_000, EqualJitter),
        BackoffCategory::PdRpc => BackoffStrategy::new(500, 3_000, EqualJitter),
        BackoffCategory::RegionMiss => BackoffStrategy::new(2, 500, NoJitter),
        BackoffCategory::UpdateLeader => BackoffStrategy::new(1, 10, NoJitter),
        BackoffCategory::ServerBusy => BackoffStrategy::new(2_000, 10_000, EqualJitter),
        BackoffCategory::TxnNotFound => BackoffStrategy::new(2, 500, NoJitter),
        BackoffCategory::CheckTimeout => BackoffStrategy::new(0, 0, NoJitter),
        BackoffCategory::CheckHealth => BackoffStrategy::new(100, 600, EqualJitter),
    }
}

/// Per-category backoff configuration.
///
/// Every category always has an entry. Serializes as a JSON object keyed by category label.
///
/// # Examples
/// ```
/// use rebound_core::BackoffTable;
/// use rebound_model::{BackoffCategory, JitterStrategy};
///
/// let table = BackoffTable::from_json_str(
///     r#"{"region-miss": {"baseMs": 10, "capMs": 640, "jitter": "none"}}"#,
/// ).unwrap();
///
/// let s = table.get(BackoffCategory::RegionMiss);
/// assert_eq!((s.base_ms, s.cap_ms, s.jitter), (10, 640, JitterStrategy::NoJitter));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BackoffTable {
    entries: BTreeMap<BackoffCategory, BackoffStrategy>,
}

impl Default for BackoffTable {
    fn default() -> Self {
        Self {
            entries: BackoffCategory::ALL
                .into_iter()
                .map(|c| (c, default_strategy(c)))
                .collect(),
        }
    }
}

impl BackoffTable {
    /// Builds a table from defaults overlaid with a JSON object of overrides.
    ///
    /// Categories missing from `json` keep their defaults. Every override is validated.
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let overrides: BTreeMap<BackoffCategory, BackoffStrategy> =
            serde_json::from_str(json).map_err(|e| CoreError::Config(e.to_string()))?;

        let mut table = Self::default();
        for (category, strategy) in overrides {
            table.set(category, strategy)?;
        }
        Ok(table)
    }

    /// Reads overrides from a JSON file, see [`BackoffTable::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Replaces the configuration of one category.
    pub fn set(&mut self, category: BackoffCategory, strategy: BackoffStrategy) -> CoreResult<()> {
        strategy.validate()?;
        debug!(
            %category,
            base_ms = strategy.base_ms,
            cap_ms = strategy.cap_ms,
            jitter = %strategy.jitter,
            "backoff override"
        );
        self.entries.insert(category, strategy);
        Ok(())
    }

    /// Returns the configuration of `category`.
    pub fn get(&self, category: BackoffCategory) -> BackoffStrategy {
        self.entries
            .get(&category)
            .copied()
            .unwrap_or_else(|| default_strategy(category))
    }

    /// Iterates over all categories in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (BackoffCategory, BackoffStrategy)> + '_ {
        self.entries.iter().map(|(c, s)| (*c, *s))
    }

    /// Starts a new retry sequence for `category` using thread-local randomness.
    pub fn create(&self, category: BackoffCategory) -> BackoffFunction {
        BackoffFunction::from_strategy(&self.get(category))
    }

    /// Starts a new retry sequence for `category` drawing jitter from `rng`.
    pub fn create_with_random<R: RandomSource>(
        &self,
        category: BackoffCategory,
        rng: R,
    ) -> BackoffFunction<R> {
        let s = self.get(category);
        BackoffFunction::with_random(s.base_ms, s.cap_ms, s.jitter, rng)
    }

    /// Starts a new category-aware retry sequence reporting into `metrics`.
    pub fn sequence(&self, category: BackoffCategory, metrics: MetricsHandle) -> CategoryBackoff {
        CategoryBackoff::new(category, self.create(category), metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_category_and_validate() {
        let table = BackoffTable::default();
        assert_eq!(table.iter().count(), BackoffCategory::ALL.len());
        for (_, s) in table.iter() {
            assert!(s.validate().is_ok(), "default {s:?} must be valid");
        }
    }

    #[test]
    fn default_values() {
        let table = BackoffTable::default();
        assert_eq!(
            table.get(BackoffCategory::ServerBusy),
            BackoffStrategy::new(2_000, 10_000, JitterStrategy::EqualJitter)
        );
        assert_eq!(
            table.get(BackoffCategory::UpdateLeader),
            BackoffStrategy::new(1, 10, JitterStrategy::NoJitter)
        );
        assert_eq!(
            table.get(BackoffCategory::CheckTimeout),
            BackoffStrategy::new(0, 0, JitterStrategy::NoJitter)
        );
    }

    #[test]
    fn overrides_merge_with_defaults() {
        let json = r#"{
            "server-busy": {"baseMs": 40, "capMs": 5120, "jitter": "equal"},
            "region_miss": {"baseMs": 10, "capMs": 640}
        }"#;
        let table = BackoffTable::from_json_str(json).unwrap();

        assert_eq!(
            table.get(BackoffCategory::ServerBusy),
            BackoffStrategy::new(40, 5_120, JitterStrategy::EqualJitter)
        );
        assert_eq!(
            table.get(BackoffCategory::RegionMiss),
            BackoffStrategy::new(10, 640, JitterStrategy::FullJitter)
        );
        assert_eq!(
            table.get(BackoffCategory::PdRpc),
            default_strategy(BackoffCategory::PdRpc)
        );
    }

    #[test]
    fn empty_object_is_defaults() {
        assert_eq!(BackoffTable::from_json_str("{}").unwrap(), BackoffTable::default());
    }

    #[test]
    fn rejects_unknown_category() {
        let err = BackoffTable::from_json_str(r#"{"disk-full": {"baseMs": 1, "capMs": 2}}"#)
            .unwrap_err();
        assert!(matches!(err, CoreError::Config(ref m) if m.contains("disk-full")));
    }

    #[test]
    fn rejects_invalid_strategy() {
        let err = BackoffTable::from_json_str(r#"{"pd-rpc": {"baseMs": 500, "capMs": 100}}"#)
            .unwrap_err();
        assert!(matches!(err, CoreError::Model(_)));
    }

    #[test]
    fn rejects_unknown_jitter() {
        let err = BackoffTable::from_json_str(
            r#"{"pd-rpc": {"baseMs": 1, "capMs": 100, "jitter": "chaotic"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = BackoffTable::from_json_file("/nonexistent/rebound/backoff.json").unwrap_err();
        assert!(matches!(err, CoreError::Config(ref m) if m.contains("/nonexistent/rebound")));
    }

    #[test]
    fn serializes_by_label() {
        let json = serde_json::to_value(BackoffTable::default()).unwrap();
        assert_eq!(json["tikv-rpc"]["baseMs"], 100);
        assert_eq!(json["tikv-rpc"]["jitter"], "equal");

        let text = serde_json::to_string(&BackoffTable::default()).unwrap();
        assert_eq!(BackoffTable::from_json_str(&text).unwrap(), BackoffTable::default());
    }

    #[test]
    fn create_starts_fresh_sequences() {
        let table = BackoffTable::default();
        let mut a = table.create(BackoffCategory::RegionMiss);
        assert_eq!(a.next_delay_ms(0), 2);
        assert_eq!(a.next_delay_ms(0), 4);

        let b = table.create(BackoffCategory::RegionMiss);
        assert_eq!(b.attempts(), 0);
        assert_eq!(b.last_delay_ms(), 2);
    }

    #[test]
    fn check_timeout_never_waits() {
        let mut b = BackoffTable::default().create(BackoffCategory::CheckTimeout);
        for _ in 0..8 {
            assert_eq!(b.next_delay_ms(0), 0);
        }
    }
}
