use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use crate::metrics::*;

/// Outcome label for a successful provider call
pub const OUTCOME_SUCCESS: &str = "success";

/// Facade over the process-wide Prometheus metrics
#[derive(Debug, Default, Clone)]
pub struct MetricsCollector;

impl MetricsCollector {
    pub fn new() -> Self {
        Self
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // LOOKUP METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn record_lookup_attempt(&self, provider: &str) {
        LOOKUP_ATTEMPTS.with_label_values(&[provider]).inc();
    }

    /// Record how a lookup ended. `outcome` is `success` or a provider error kind.
    pub fn record_lookup_outcome(&self, provider: &str, outcome: &str, elapsed: Duration) {
        LOOKUP_OUTCOMES.with_label_values(&[provider, outcome]).inc();
        LOOKUP_LATENCY
            .with_label_values(&[provider])
            .observe(elapsed.as_secs_f64() * 1000.0);
    }

    pub fn record_record_resolved(&self) {
        RECORDS_RESOLVED.inc();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // GEOCODING, PERSISTENCE, SERVICE
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn record_geocode_outcome(&self, geocoder: &str, outcome: &str) {
        GEOCODE_OUTCOMES.with_label_values(&[geocoder, outcome]).inc();
    }

    pub fn record_checkpoint(&self) {
        CHECKPOINTS.inc();
    }

    pub fn record_lookdown_request(&self, status: u16) {
        LOOKDOWN_REQUESTS
            .with_label_values(&[status.to_string().as_str()])
            .inc();
    }

    /// Export all metrics in Prometheus text format
    pub fn export_metrics(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| MetricsError::EncodingError(e.to_string()))?;

        String::from_utf8(buffer).map_err(|e| MetricsError::EncodingError(e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("encoding error: {0}")]
    EncodingError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::new();
        assert!(collector.export_metrics().is_ok());
    }

    #[test]
    fn test_record_lookup_metrics() {
        let collector = MetricsCollector::new();
        let before = LOOKUP_OUTCOMES
            .with_label_values(&["test-vendor", "parse"])
            .get();

        collector.record_lookup_attempt("test-vendor");
        collector.record_lookup_outcome("test-vendor", "parse", Duration::from_millis(120));
        collector.record_lookup_outcome("test-vendor", OUTCOME_SUCCESS, Duration::from_millis(80));
        collector.record_record_resolved();

        assert_eq!(
            LOOKUP_OUTCOMES
                .with_label_values(&["test-vendor", "parse"])
                .get(),
            before + 1
        );

        let metrics = collector.export_metrics().unwrap();
        assert!(metrics.contains("phone_append_lookup_attempts_total"));
        assert!(metrics.contains("phone_append_lookup_outcomes_total"));
        assert!(metrics.contains("phone_append_lookup_latency_ms"));
        assert!(metrics.contains("phone_append_records_resolved_total"));
    }

    #[test]
    fn test_record_geocode_checkpoint_and_lookdown_metrics() {
        let collector = MetricsCollector::new();
        collector.record_geocode_outcome("mock", "zero_results");
        collector.record_checkpoint();
        collector.record_lookdown_request(401);

        let metrics = collector.export_metrics().unwrap();
        assert!(metrics.contains("phone_append_geocode_outcomes_total"));
        assert!(metrics.contains("phone_append_checkpoints_total"));
        assert!(metrics.contains(r#"phone_append_lookdown_requests_total{status="401"}"#));
    }
}
