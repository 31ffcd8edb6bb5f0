use std::sync::Arc;

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry, proto::MetricFamily};

use rebound_core::MetricsBackend;

/// Prometheus metrics backend.
///
/// Label cardinality is bounded by the fixed category and jitter enumerations.
#[derive(Clone)]
pub struct PrometheusMetrics {
    backoffs: CounterVec,
    clamped: CounterVec,
    delay: HistogramVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Create a backend registering into `registry`.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let backoffs = CounterVec::new(
            Opts::new("backoff_total", "Total number of computed backoff delays")
                .namespace("rebound"),
            &["category", "jitter"],
        )?;
        registry.register(Box::new(backoffs.clone()))?;

        let clamped = CounterVec::new(
            Opts::new(
                "backoff_clamped_total",
                "Backoff delays cut by the caller's maximum delay",
            )
            .namespace("rebound"),
            &["category"],
        )?;
        registry.register(Box::new(clamped.clone()))?;

        let delay = HistogramVec::new(
            HistogramOpts::new("backoff_delay_seconds", "Computed backoff delay in seconds")
                .namespace("rebound")
                .buckets(vec![0.0, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
            &["category"],
        )?;
        registry.register(Box::new(delay.clone()))?;

        Ok(Self {
            backoffs,
            clamped,
            delay,
            registry,
        })
    }

    /// Create a backend with its own registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metrics for exposition.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_backoff(&self, category: &str, jitter: &str, delay_ms: u64, clamped: bool) {
        self.backoffs.with_label_values(&[category, jitter]).inc();
        if clamped {
            self.clamped.with_label_values(&[category]).inc();
        }
        self.delay
            .with_label_values(&[category])
            .observe(delay_ms as f64 / 1000.0);
    }
}

#[cfg(test)]
mod tests {
    use rebound_core::BackoffTable;
    use rebound_model::BackoffCategory;

    use super::*;
    use prometheus::Encoder;

    fn exposition(metrics: &PrometheusMetrics) -> String {
        let mut buf = Vec::new();
        prometheus::TextEncoder::new()
            .encode(&metrics.gather(), &mut buf)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn family<'a>(families: &'a [MetricFamily], name: &str) -> &'a MetricFamily {
        families
            .iter()
            .find(|f| f.name() == name)
            .unwrap_or_else(|| panic!("metric {name} not found"))
    }

    #[test]
    fn counts_per_category_and_jitter() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.record_backoff("tikv-rpc", "equal", 120, false);
        metrics.record_backoff("tikv-rpc", "equal", 250, false);
        metrics.record_backoff("region-miss", "none", 2, false);

        let families = metrics.gather();
        let total = family(&families, "rebound_backoff_total");
        assert_eq!(total.get_metric().len(), 2);

        let delay = family(&families, "rebound_backoff_delay_seconds");
        assert_eq!(delay.get_metric().len(), 2);
    }

    #[test]
    fn clamped_only_counted_when_clamped() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.record_backoff("server-busy", "equal", 2_000, false);
        assert!(
            metrics
                .gather()
                .iter()
                .all(|f| f.name() != "rebound_backoff_clamped_total")
        );

        metrics.record_backoff("server-busy", "equal", 500, true);
        let text = exposition(&metrics);
        assert!(text.contains(r#"rebound_backoff_clamped_total{category="server-busy"} 1"#));
        assert!(text.contains(r#"rebound_backoff_total{category="server-busy",jitter="equal"} 2"#));
    }

    #[test]
    fn sequence_reports_into_backend() {
        let metrics = PrometheusMetrics::new().unwrap();
        let mut seq = BackoffTable::default()
            .sequence(BackoffCategory::UpdateLeader, Arc::new(metrics.clone()));
        for _ in 0..5 {
            seq.next_delay_ms(0);
        }

        let text = exposition(&metrics);
        assert!(text.contains(r#"rebound_backoff_total{category="update-leader",jitter="none"} 5"#));
        assert!(text.contains(r#"rebound_backoff_delay_seconds_count{category="update-leader"} 5"#));
    }

    #[test]
    fn shared_registry_rejects_duplicate_backend() {
        let registry = Arc::new(Registry::new());
        let _first = PrometheusMetrics::new_with_registry(registry.clone()).unwrap();
        assert!(PrometheusMetrics::new_with_registry(registry).is_err());
    }
}
