use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{ModelError, ModelResult};

/// Failure category a retry sequence backs off for.
///
/// Categories are configuration keys only: they select which
/// [`crate::BackoffStrategy`] a new retry sequence starts with.
/// Classifying an error into a category is the caller's job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackoffCategory {
    /// Storage node RPC failed (network error, timeout).
    TikvRpc,
    /// A transaction lock is held by another transaction.
    TxnLock,
    /// Lock contention on the fast resolve path.
    TxnLockFast,
    /// Placement driver RPC failed.
    PdRpc,
    /// Cached region routing metadata is stale or missing.
    RegionMiss,
    /// Region leader changed and must be refreshed.
    UpdateLeader,
    /// Server reported it is too busy to serve the request.
    ServerBusy,
    /// Transaction status lookup did not find the transaction.
    TxnNotFound,
    /// Transaction status check timed out.
    CheckTimeout,
    /// Health check did not answer in time.
    CheckHealth,
}

impl BackoffCategory {
    /// All categories, in declaration order.
    pub const ALL: [BackoffCategory; 10] = [
        BackoffCategory::TikvRpc,
        BackoffCategory::TxnLock,
        BackoffCategory::TxnLockFast,
        BackoffCategory::PdRpc,
        BackoffCategory::RegionMiss,
        BackoffCategory::UpdateLeader,
        BackoffCategory::ServerBusy,
        BackoffCategory::TxnNotFound,
        BackoffCategory::CheckTimeout,
        BackoffCategory::CheckHealth,
    ];

    /// Return label value for config keys, logs and metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            BackoffCategory::TikvRpc => "tikv-rpc",
            BackoffCategory::TxnLock => "txn-lock",
            BackoffCategory::TxnLockFast => "txn-lock-fast",
            BackoffCategory::PdRpc => "pd-rpc",
            BackoffCategory::RegionMiss => "region-miss",
            BackoffCategory::UpdateLeader => "update-leader",
            BackoffCategory::ServerBusy => "server-busy",
            BackoffCategory::TxnNotFound => "txn-not-found",
            BackoffCategory::CheckTimeout => "check-timeout",
            BackoffCategory::CheckHealth => "check-health",
        }
    }
}

impl FromStr for BackoffCategory {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        let norm = s.trim().to_ascii_lowercase().replace('_', "-");
        BackoffCategory::ALL
            .into_iter()
            .find(|c| c.as_label() == norm)
            .ok_or_else(|| ModelError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for BackoffCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

impl Serialize for BackoffCategory {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_label())
    }
}

impl<'de> Deserialize<'de> for BackoffCategory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn labels_are_unique() {
        let labels: HashSet<_> = BackoffCategory::ALL.iter().map(|c| c.as_label()).collect();
        assert_eq!(labels.len(), BackoffCategory::ALL.len());
    }

    #[test]
    fn parses_labels_and_underscores() {
        assert_eq!(
            "server-busy".parse::<BackoffCategory>().unwrap(),
            BackoffCategory::ServerBusy
        );
        assert_eq!(
            "TXN_LOCK_FAST".parse::<BackoffCategory>().unwrap(),
            BackoffCategory::TxnLockFast
        );
        for c in BackoffCategory::ALL {
            assert_eq!(c.to_string().parse::<BackoffCategory>().unwrap(), c);
        }
    }

    #[test]
    fn rejects_unknown_category() {
        let err = "disk-full".parse::<BackoffCategory>().unwrap_err();
        assert!(matches!(err, ModelError::UnknownCategory(ref s) if s == "disk-full"));
    }

    #[test]
    fn serde_as_map_key() {
        let json = r#"{"region-miss": 1, "pd-rpc": 2}"#;
        let map: std::collections::BTreeMap<BackoffCategory, u32> =
            serde_json::from_str(json).unwrap();
        assert_eq!(map[&BackoffCategory::RegionMiss], 1);
        assert_eq!(map[&BackoffCategory::PdRpc], 2);
    }
}
