// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

use crate::persistence::QueryLog;

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Order lifecycle (placements, cancellations, stock rejections)
// - Listings per strategy: how many, how long, and which statements they
//   issued, labelled by query kind
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // Order Lifecycle Metrics
    pub orders_placed: IntCounter,
    pub orders_cancelled: IntCounter,
    pub stock_rejections: IntCounter,

    // Listing Metrics
    pub listings_total: IntCounterVec,
    pub listing_queries: IntCounterVec,
    pub listing_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Order Lifecycle Metrics
        let orders_placed = IntCounter::new("orders_placed_total", "Total orders placed")?;
        registry.register(Box::new(orders_placed.clone()))?;

        let orders_cancelled = IntCounter::new("orders_cancelled_total", "Total orders cancelled")?;
        registry.register(Box::new(orders_cancelled.clone()))?;

        let stock_rejections = IntCounter::new(
            "stock_rejections_total",
            "Order placements rejected for insufficient stock",
        )?;
        registry.register(Box::new(stock_rejections.clone()))?;

        // Listing Metrics
        let listings_total = IntCounterVec::new(
            Opts::new("order_listings_total", "Total order listings served"),
            &["strategy"],
        )?;
        registry.register(Box::new(listings_total.clone()))?;

        let listing_queries = IntCounterVec::new(
            Opts::new("order_listing_queries_total", "Statements issued by order listings"),
            &["strategy", "kind"],
        )?;
        registry.register(Box::new(listing_queries.clone()))?;

        let listing_duration = HistogramVec::new(
            HistogramOpts::new("order_listing_duration_seconds", "Order listing duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["strategy"],
        )?;
        registry.register(Box::new(listing_duration.clone()))?;

        Ok(Self {
            registry,
            orders_placed,
            orders_cancelled,
            stock_rejections,
            listings_total,
            listing_queries,
            listing_duration,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record one served listing and the statements it cost
    pub fn record_listing(&self, strategy: &str, queries: &QueryLog, duration_secs: f64) {
        self.listings_total.with_label_values(&[strategy]).inc();
        for (kind, count) in queries.iter() {
            self.listing_queries
                .with_label_values(&[strategy, kind.as_str()])
                .inc_by(count);
        }
        self.listing_duration.with_label_values(&[strategy]).observe(duration_secs);
    }

    pub fn record_order_placed(&self) {
        self.orders_placed.inc();
    }

    pub fn record_order_cancelled(&self) {
        self.orders_cancelled.inc();
    }

    pub fn record_stock_rejection(&self) {
        self.stock_rejections.inc();
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}
