//! Prometheus metrics for the QR code service
//!
//! Counters and histograms are registered once in a process-wide registry and
//! exposed in text format at `GET /metrics`.

use crate::model::ImageFormat;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Global metrics registry instance
pub static METRICS: Lazy<Arc<MetricsCollector>> = Lazy::new(|| Arc::new(MetricsCollector::new()));

/// How a request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Invalid,
    Error,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Invalid => "invalid",
            Outcome::Error => "error",
        }
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    /// Route, e.g. "qrcode"
    pub endpoint: String,
    /// "success", "invalid" or "error"
    pub outcome: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct EndpointLabels {
    pub endpoint: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct FieldLabels {
    /// Query parameter that failed validation
    pub field: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct FailureLabels {
    pub kind: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct FormatLabels {
    pub format: String,
}

/// Central metrics collector with Prometheus registry
pub struct MetricsCollector {
    registry: RwLock<Registry>,

    /// Requests by endpoint and outcome
    pub requests_total: Family<RequestLabels, Counter>,

    /// Request latency by endpoint
    pub request_duration_seconds: Family<EndpointLabels, Histogram>,

    /// Rejected requests by offending parameter
    pub validation_failures_total: Family<FieldLabels, Counter>,

    /// Encode/render failures by kind
    pub generation_failures_total: Family<FailureLabels, Counter>,

    /// Bytes of image data served by format
    pub image_bytes_total: Family<FormatLabels, Counter>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        let mut registry = Registry::default();

        // Counter names get the `_total` suffix appended on encode.
        let requests_total = Family::<RequestLabels, Counter>::default();
        registry.register(
            "qrcode_requests",
            "Total number of HTTP requests",
            requests_total.clone(),
        );

        let request_duration_seconds =
            Family::<EndpointLabels, Histogram>::new_with_constructor(|| {
                // 1ms up to ~2s
                Histogram::new(exponential_buckets(0.001, 2.0, 12))
            });
        registry.register(
            "qrcode_request_duration_seconds",
            "Request latency histogram in seconds",
            request_duration_seconds.clone(),
        );

        let validation_failures_total = Family::<FieldLabels, Counter>::default();
        registry.register(
            "qrcode_validation_failures",
            "Requests rejected by parameter validation",
            validation_failures_total.clone(),
        );

        let generation_failures_total = Family::<FailureLabels, Counter>::default();
        registry.register(
            "qrcode_generation_failures",
            "Requests that failed while encoding or rendering",
            generation_failures_total.clone(),
        );

        let image_bytes_total = Family::<FormatLabels, Counter>::default();
        registry.register(
            "qrcode_image_bytes",
            "Image bytes served",
            image_bytes_total.clone(),
        );

        Self {
            registry: RwLock::new(registry),
            requests_total,
            request_duration_seconds,
            validation_failures_total,
            generation_failures_total,
            image_bytes_total,
        }
    }

    /// Encode metrics in Prometheus text format
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        let registry = self.registry.read();
        encode(&mut buffer, &registry)?;
        Ok(buffer)
    }

    pub fn record_request(&self, endpoint: &str, outcome: Outcome, duration: Duration) {
        self.requests_total
            .get_or_create(&RequestLabels {
                endpoint: endpoint.to_string(),
                outcome: outcome.as_str().to_string(),
            })
            .inc();

        self.request_duration_seconds
            .get_or_create(&EndpointLabels {
                endpoint: endpoint.to_string(),
            })
            .observe(duration.as_secs_f64());
    }

    pub fn record_validation_failure(&self, field: &str) {
        self.validation_failures_total
            .get_or_create(&FieldLabels {
                field: field.to_string(),
            })
            .inc();
    }

    pub fn record_generation_failure(&self, kind: &str) {
        self.generation_failures_total
            .get_or_create(&FailureLabels {
                kind: kind.to_string(),
            })
            .inc();
    }

    pub fn record_image(&self, format: ImageFormat, bytes: usize) {
        self.image_bytes_total
            .get_or_create(&FormatLabels {
                format: format.as_str().to_string(),
            })
            .inc_by(bytes as u64);
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard for request timing
///
/// Records the outcome and latency when completed. A guard dropped without an
/// outcome (e.g. the handler future was cancelled) counts as an error.
pub struct RequestMetrics {
    collector: Arc<MetricsCollector>,
    endpoint: &'static str,
    start: Instant,
    completed: bool,
}

impl RequestMetrics {
    /// Starts timing a request against the global collector.
    pub fn new(endpoint: &'static str) -> Self {
        Self::with_collector(METRICS.clone(), endpoint)
    }

    pub fn with_collector(collector: Arc<MetricsCollector>, endpoint: &'static str) -> Self {
        Self {
            collector,
            endpoint,
            start: Instant::now(),
            completed: false,
        }
    }

    pub fn success(mut self, format: ImageFormat, bytes: usize) {
        self.collector.record_image(format, bytes);
        self.finish(Outcome::Success);
    }

    pub fn invalid(mut self, field: &str) {
        self.collector.record_validation_failure(field);
        self.finish(Outcome::Invalid);
    }

    pub fn error(mut self, kind: &str) {
        self.collector.record_generation_failure(kind);
        self.finish(Outcome::Error);
    }

    fn finish(&mut self, outcome: Outcome) {
        self.collector
            .record_request(self.endpoint, outcome, self.start.elapsed());
        self.completed = true;
    }
}

impl Drop for RequestMetrics {
    fn drop(&mut self) {
        if !self.completed {
            self.finish(Outcome::Error);
        }
    }
}
