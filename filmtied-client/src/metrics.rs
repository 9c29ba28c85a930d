//! Client metrics
//!
//! OpenTelemetry instruments recorded by the client when observability is
//! enabled through `ClientBuilder::with_observability()`:
//!
//! - **requests_total** / **request_duration**: per method and status
//! - **errors_total**: per error kind
//! - **cache_hits** / **cache_misses**: per method

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};

/// Client metrics for monitoring
pub struct ClientMetrics {
    /// Total number of calls made
    pub requests_total: Counter<u64>,
    /// Call duration in seconds, cache hits included
    pub request_duration: Histogram<f64>,
    /// Total number of failed calls
    pub errors_total: Counter<u64>,
    /// Calls answered from the cache
    pub cache_hits: Counter<u64>,
    /// Calls that had to go to the service
    pub cache_misses: Counter<u64>,
}

impl ClientMetrics {
    pub fn new(service_name: impl Into<String>) -> Self {
        let name: &'static str = Box::leak(service_name.into().into_boxed_str());
        let meter = global::meter(name);
        Self::new_with_meter(&meter)
    }

    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            requests_total: meter
                .u64_counter("filmtied.client.requests.total")
                .with_description("Total number of calls made")
                .build(),
            request_duration: meter
                .f64_histogram("filmtied.client.request.duration")
                .with_description("Call duration in seconds")
                .with_unit("s")
                .build(),
            errors_total: meter
                .u64_counter("filmtied.client.errors.total")
                .with_description("Total number of failed calls")
                .build(),
            cache_hits: meter
                .u64_counter("filmtied.client.cache.hits")
                .with_description("Calls answered from the response cache")
                .build(),
            cache_misses: meter
                .u64_counter("filmtied.client.cache.misses")
                .with_description("Calls not found in the response cache")
                .build(),
        }
    }

    pub fn record_request(&self, method: &str, status: &str, duration_secs: f64) {
        let attributes = &[
            KeyValue::new("method", method.to_string()),
            KeyValue::new("status", status.to_string()),
        ];
        self.requests_total.add(1, attributes);
        self.request_duration.record(duration_secs, attributes);
    }

    pub fn record_error(&self, error_type: &str) {
        let attributes = &[KeyValue::new("error_type", error_type.to_string())];
        self.errors_total.add(1, attributes);
    }

    pub fn record_cache_hit(&self, method: &str) {
        self.cache_hits
            .add(1, &[KeyValue::new("method", method.to_string())]);
    }

    pub fn record_cache_miss(&self, method: &str) {
        self.cache_misses
            .add(1, &[KeyValue::new("method", method.to_string())]);
    }
}
