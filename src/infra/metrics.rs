/// Metrics for the purchase flow.
#[derive(Debug, Clone, prometheus_metric_storage::MetricStorage)]
#[metric(subsystem = "checkout")]
struct Metrics {
    /// The number of times the buy modal was opened.
    flows_opened: prometheus::IntCounter,

    /// The number of checkout handoffs, by backend.
    #[metric(labels("backend"))]
    handoffs: prometheus::IntCounterVec,

    /// Errors that occurred while preparing a checkout.
    #[metric(labels("reason"))]
    build_errors: prometheus::IntCounterVec,
}

pub fn flow_opened() {
    get().flows_opened.inc();
}

pub fn handoff(backend: &str) {
    get().handoffs.with_label_values(&[backend]).inc();
}

pub fn build_error(reason: &str) {
    get().build_errors.with_label_values(&[reason]).inc();
}

/// Get the metrics instance.
fn get() -> &'static Metrics {
    Metrics::instance(registry()).expect("unexpected error getting metrics instance")
}

/// Get the global instance of the metrics registry.
fn registry() -> &'static prometheus_metric_storage::StorageRegistry {
    static REGISTRY: std::sync::OnceLock<prometheus_metric_storage::StorageRegistry> =
        std::sync::OnceLock::new();
    REGISTRY.get_or_init(prometheus_metric_storage::StorageRegistry::default)
}
