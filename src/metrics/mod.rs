// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};
use std::time::Duration;

// Re-export for public API
pub use server::metrics_handler;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - HTTP traffic (requests by route and status, latency)
// - Order outcomes (created, reference conflicts, deleted)
//
// All metrics are registered with a dedicated registry and scraped via
// GET /metrics.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // HTTP Metrics
    pub http_requests_total: IntCounterVec,
    pub http_request_duration: HistogramVec,

    // Order Metrics
    pub orders_created_total: IntCounter,
    pub order_reference_conflicts_total: IntCounter,
    pub orders_deleted_total: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // HTTP Metrics
        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests handled"),
            &["method", "route", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration = HistogramVec::new(
            HistogramOpts::new("http_request_duration_seconds", "HTTP request handling duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["method", "route"],
        )?;
        registry.register(Box::new(http_request_duration.clone()))?;

        // Order Metrics
        let orders_created_total =
            IntCounter::new("orders_created_total", "Total orders created")?;
        registry.register(Box::new(orders_created_total.clone()))?;

        let order_reference_conflicts_total = IntCounter::new(
            "order_reference_conflicts_total",
            "Order creations rejected because the reference already exists",
        )?;
        registry.register(Box::new(order_reference_conflicts_total.clone()))?;

        let orders_deleted_total =
            IntCounter::new("orders_deleted_total", "Total orders deleted")?;
        registry.register(Box::new(orders_deleted_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration,
            orders_created_total,
            order_reference_conflicts_total,
            orders_deleted_total,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record one handled HTTP request
    pub fn record_request(&self, method: &str, route: &str, status: u16, elapsed: Duration) {
        let status = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, route, status.as_str()])
            .inc();
        self.http_request_duration
            .with_label_values(&[method, route])
            .observe(elapsed.as_secs_f64());
    }
}
