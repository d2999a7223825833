//! Prometheus metrics for the type-ahead engine.
//!
//! Metrics are process-global and cheap to update from any task. Call
//! [`init_metrics`] once at startup to register them for export.
//!
//! # Example
//! ```no_run
//! use incident_typeahead::metrics::{gather_metrics, init_metrics};
//!
//! init_metrics().expect("metrics registered once");
//! println!("{}", gather_metrics());
//! ```

use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};

const NAMESPACE: &str = "incident_typeahead";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Rounds admitted into visible state
    ///
    /// Labels: outcome
    pub static ref ROUNDS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("rounds_total", "Search rounds admitted into visible state")
            .namespace(NAMESPACE),
        &["outcome"]
    ).expect("Failed to create ROUNDS_TOTAL metric");

    /// Rounds dropped because a newer round or a clear superseded them
    pub static ref ROUNDS_DISCARDED_TOTAL: Counter = Counter::with_opts(
        Opts::new("rounds_discarded_total", "Search rounds discarded as stale")
            .namespace(NAMESPACE)
    ).expect("Failed to create ROUNDS_DISCARDED_TOTAL metric");

    /// Failed collection queries
    ///
    /// Labels: source
    pub static ref BRANCH_FAILURES_TOTAL: CounterVec = CounterVec::new(
        Opts::new("branch_failures_total", "Failed collection queries")
            .namespace(NAMESPACE),
        &["source"]
    ).expect("Failed to create BRANCH_FAILURES_TOTAL metric");

    /// Records skipped during normalization
    ///
    /// Labels: source
    pub static ref NORMALIZATION_DEFECTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("normalization_defects_total", "Records skipped during normalization")
            .namespace(NAMESPACE),
        &["source"]
    ).expect("Failed to create NORMALIZATION_DEFECTS_TOTAL metric");

    /// Results selected by the user
    ///
    /// Labels: source
    pub static ref SELECTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("selections_total", "Results selected from the dropdown")
            .namespace(NAMESPACE),
        &["source"]
    ).expect("Failed to create SELECTIONS_TOTAL metric");

    /// Time until every branch of a round settled
    ///
    /// Buckets: 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0
    pub static ref ROUND_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "round_duration_seconds",
            "Time until every branch of a search round settled"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0])
    ).expect("Failed to create ROUND_DURATION_SECONDS metric");
}

/// Register all metrics with the global registry
///
/// Returns an error if called twice.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(ROUNDS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(ROUNDS_DISCARDED_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(BRANCH_FAILURES_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(NORMALIZATION_DEFECTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(SELECTIONS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(ROUND_DURATION_SECONDS.clone()))?;

    tracing::debug!("Type-ahead metrics registered");
    Ok(())
}

/// Render registered metrics in Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration_and_export() {
        init_metrics().unwrap();
        assert!(init_metrics().is_err());

        ROUNDS_TOTAL.with_label_values(&["success"]).inc();
        ROUNDS_DISCARDED_TOTAL.inc();

        let output = gather_metrics();
        assert!(output.contains("incident_typeahead_rounds_total"));
        assert!(output.contains("incident_typeahead_rounds_discarded_total"));
    }
}
