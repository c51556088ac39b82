//! Prometheus metrics collection for gpt-relay
//!
//! Tracks:
//! - Relay requests by outcome
//! - Upstream round-trip latency
//! - Upstream responses by status class
//!
//! Metrics are exposed via the `/metrics` endpoint in Prometheus text format.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Outcome of a single POST relay, used as a bounded metrics label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Upstream answered 2xx and the body was relayed
    Success,
    /// Rejected before contacting upstream (auth, key format, body)
    ClientError,
    /// Upstream answered non-2xx
    UpstreamError,
    /// Network, timeout or parse failure
    TransportError,
}

impl Outcome {
    /// Convert outcome to Prometheus label string
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::ClientError => "client_error",
            Outcome::UpstreamError => "upstream_error",
            Outcome::TransportError => "transport_error",
        }
    }
}

/// Status class label for an upstream HTTP status
pub fn status_class(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

/// Metrics collector for the relay
#[derive(Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,
    requests_total: IntCounterVec,
    upstream_duration: HistogramVec,
    upstream_status: IntCounterVec,
}

impl Metrics {
    /// Create a new Metrics instance registered with a fresh registry
    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails (e.g., duplicate names).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Cardinality: 4 outcomes
        let requests_total = IntCounterVec::new(
            Opts::new(
                "gpt_relay_requests_total",
                "Total number of relayed chat completion requests by outcome",
            ),
            &["outcome"],
        )?;

        // Upstream models routinely take seconds; buckets reach two minutes
        let upstream_duration = HistogramVec::new(
            HistogramOpts::new(
                "gpt_relay_upstream_duration_ms",
                "Upstream chat completion round-trip latency in milliseconds",
            )
            .buckets(vec![
                50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0, 60000.0,
                120000.0,
            ]),
            &["outcome"],
        )?;

        let upstream_status = IntCounterVec::new(
            Opts::new(
                "gpt_relay_upstream_status_total",
                "Upstream responses by HTTP status class",
            ),
            &["status_class"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(upstream_duration.clone()))?;
        registry.register(Box::new(upstream_status.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            requests_total,
            upstream_duration,
            upstream_status,
        })
    }

    /// Record one relay request with its outcome
    pub fn record_request(&self, outcome: Outcome) -> Result<(), prometheus::Error> {
        self.requests_total
            .get_metric_with_label_values(&[outcome.as_str()])?
            .inc();
        Ok(())
    }

    /// Record the upstream round-trip duration
    ///
    /// # Errors
    ///
    /// Returns an error if `duration_ms` is NaN, infinite or negative.
    pub fn record_upstream_duration(
        &self,
        outcome: Outcome,
        duration_ms: f64,
    ) -> Result<(), prometheus::Error> {
        if !duration_ms.is_finite() || duration_ms < 0.0 {
            return Err(prometheus::Error::Msg(format!(
                "Histogram value must be finite and non-negative, got: {}",
                duration_ms
            )));
        }

        self.upstream_duration
            .get_metric_with_label_values(&[outcome.as_str()])?
            .observe(duration_ms);
        Ok(())
    }

    /// Record an upstream HTTP status
    pub fn record_upstream_status(&self, status: u16) -> Result<(), prometheus::Error> {
        self.upstream_status
            .get_metric_with_label_values(&[status_class(status)])?
            .inc();
        Ok(())
    }

    /// Current request count for an outcome
    pub fn requests_count(&self, outcome: Outcome) -> u64 {
        self.requests_total
            .get_metric_with_label_values(&[outcome.as_str()])
            .map(|counter| counter.get())
            .unwrap_or(0)
    }

    /// Encode all registered metrics in Prometheus text format
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    metric_family_count = metric_families.len(),
                    "Prometheus text encoder failed"
                );
                e
            })?;

        String::from_utf8(buffer)
            .map_err(|e| prometheus::Error::Msg(format!("Metrics output is not UTF-8: {}", e)))
    }
}
