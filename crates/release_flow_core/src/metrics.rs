// Metrics recording abstraction for webhook processing and builds

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

/// Abstraction for recording release flow metrics.
///
/// # Thread Safety
/// All implementations MUST be thread-safe (Send + Sync).
pub trait ReleaseMetrics: Send + Sync {
    /// Records an inbound webhook of a supported event type.
    fn record_webhook_received(&self, event: &str);

    /// Records a redelivery of an already recorded webhook.
    fn record_duplicate_webhook(&self, event: &str);

    /// Records a quality gate evaluation that found missing checks.
    fn record_quality_gate_incomplete(&self);

    /// Records a build that was cut.
    ///
    /// # Arguments
    /// * `build_type` - `productive` or `test`
    fn record_build_created(&self, build_type: &str);
}

/// Prometheus metrics collector.
///
/// # Metrics
/// - `release_flow_webhooks_received_total` (CounterVec, label `event`)
/// - `release_flow_duplicate_webhooks_total` (CounterVec, label `event`)
/// - `release_flow_quality_gate_incomplete_total` (Counter)
/// - `release_flow_builds_created_total` (CounterVec, label `build_type`)
pub struct PrometheusReleaseMetrics {
    webhooks_received: IntCounterVec,
    duplicate_webhooks: IntCounterVec,
    quality_gate_incomplete: IntCounter,
    builds_created: IntCounterVec,
}

impl PrometheusReleaseMetrics {
    /// Creates the collectors and registers them with `registry`.
    ///
    /// # Errors
    /// Returns an error if a metric with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let webhooks_received = IntCounterVec::new(
            Opts::new(
                "release_flow_webhooks_received_total",
                "Webhooks received, by event type",
            ),
            &["event"],
        )?;
        let duplicate_webhooks = IntCounterVec::new(
            Opts::new(
                "release_flow_duplicate_webhooks_total",
                "Redelivered webhooks that were already recorded, by event type",
            ),
            &["event"],
        )?;
        let quality_gate_incomplete = IntCounter::new(
            "release_flow_quality_gate_incomplete_total",
            "Quality gate evaluations with missing checks",
        )?;
        let builds_created = IntCounterVec::new(
            Opts::new("release_flow_builds_created_total", "Builds cut, by build type"),
            &["build_type"],
        )?;

        registry.register(Box::new(webhooks_received.clone()))?;
        registry.register(Box::new(duplicate_webhooks.clone()))?;
        registry.register(Box::new(quality_gate_incomplete.clone()))?;
        registry.register(Box::new(builds_created.clone()))?;

        Ok(Self {
            webhooks_received,
            duplicate_webhooks,
            quality_gate_incomplete,
            builds_created,
        })
    }
}

impl ReleaseMetrics for PrometheusReleaseMetrics {
    fn record_webhook_received(&self, event: &str) {
        self.webhooks_received.with_label_values(&[event]).inc();
    }

    fn record_duplicate_webhook(&self, event: &str) {
        self.duplicate_webhooks.with_label_values(&[event]).inc();
    }

    fn record_quality_gate_incomplete(&self) {
        self.quality_gate_incomplete.inc();
    }

    fn record_build_created(&self, build_type: &str) {
        self.builds_created.with_label_values(&[build_type]).inc();
    }
}

/// No-op metrics implementation for testing or when metrics are disabled.
pub struct NoOpReleaseMetrics;

impl NoOpReleaseMetrics {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpReleaseMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ReleaseMetrics for NoOpReleaseMetrics {
    fn record_webhook_received(&self, _event: &str) {}
    fn record_duplicate_webhook(&self, _event: &str) {}
    fn record_quality_gate_incomplete(&self) {}
    fn record_build_created(&self, _build_type: &str) {}
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
