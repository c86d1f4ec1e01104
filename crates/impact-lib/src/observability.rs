//! Observability for impact analysis runs
//!
//! Provides:
//! - Prometheus metrics (report computation latency, snapshot and rollup counts,
//!   unavailable results)
//! - Structured logging with tracing
//!
//! The analytics functions themselves stay pure; callers record metrics and
//! log events around them.

use crate::report::ImpactReport;
use prometheus::{
    register_histogram, register_int_counter, register_int_gauge, Encoder, Histogram, IntCounter,
    IntGauge, TextEncoder,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for report computation (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ReportMetricsInner> = OnceLock::new();

struct ReportMetricsInner {
    computation_seconds: Histogram,
    snapshots_analyzed: IntGauge,
    monthly_rollups: IntGauge,
    unavailable_results: IntCounter,
}

impl ReportMetricsInner {
    fn new() -> Self {
        Self {
            computation_seconds: register_histogram!(
                "impact_report_computation_seconds",
                "Time spent computing an impact report",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register impact_report_computation_seconds"),

            snapshots_analyzed: register_int_gauge!(
                "impact_snapshots_analyzed",
                "Number of snapshots in the last analyzed cost feed"
            )
            .expect("Failed to register impact_snapshots_analyzed"),

            monthly_rollups: register_int_gauge!(
                "impact_monthly_rollups",
                "Number of calendar months in the last report"
            )
            .expect("Failed to register impact_monthly_rollups"),

            unavailable_results: register_int_counter!(
                "impact_unavailable_results_total",
                "Report structures that were unavailable for lack of cutoff or data"
            )
            .expect("Failed to register impact_unavailable_results_total"),
        }
    }
}

/// Handle to the process-wide report metrics
///
/// Clones share the same underlying metrics.
#[derive(Clone)]
pub struct ReportMetrics {
    _private: (),
}

impl Default for ReportMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportMetrics {
    /// Create a handle, registering the metrics on first use
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ReportMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ReportMetricsInner {
        GLOBAL_METRICS.get_or_init(ReportMetricsInner::new)
    }

    pub fn observe_computation(&self, duration_secs: f64) {
        self.inner().computation_seconds.observe(duration_secs);
    }

    /// Record the shape of a finished report
    pub fn record_report(&self, report: &ImpactReport) {
        let inner = self.inner();
        inner.snapshots_analyzed.set(report.snapshot_count as i64);
        inner
            .monthly_rollups
            .set(report.monthly_rollups.as_ref().map_or(0, Vec::len) as i64);
        inner
            .unavailable_results
            .inc_by(report.unavailable_count() as u64);
    }

    pub fn inc_unavailable(&self) {
        self.inner().unavailable_results.inc();
    }

    /// Render every registered metric in the Prometheus text format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Structured logger for analysis runs
#[derive(Clone)]
pub struct StructuredLogger {
    source: String,
}

impl StructuredLogger {
    /// `source` names the feed being analyzed, usually its file path
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn log_feed_loaded(&self, kind: &str, snapshots: usize) {
        info!(
            event = "feed_loaded",
            source = %self.source,
            kind = %kind,
            snapshots = snapshots,
            "Loaded snapshot feed"
        );
    }

    /// Log the outcome of a report computation
    pub fn log_report(&self, report: &ImpactReport, duration_secs: f64) {
        let unavailable = report.unavailable_count();
        let total_savings = report.savings.map(|s| s.total_savings);

        if unavailable > 0 {
            warn!(
                event = "impact_report",
                source = %self.source,
                snapshots = report.snapshot_count,
                unavailable = unavailable,
                total_savings = ?total_savings,
                duration_secs = duration_secs,
                "Impact report computed with unavailable results"
            );
        } else {
            info!(
                event = "impact_report",
                source = %self.source,
                snapshots = report.snapshot_count,
                total_savings = ?total_savings,
                duration_secs = duration_secs,
                "Impact report computed"
            );
        }
    }

    /// Log a structure that could not be computed
    pub fn log_unavailable(&self, metric: &str, reason: &str) {
        warn!(
            event = "metric_unavailable",
            source = %self.source,
            metric = %metric,
            reason = %reason,
            "Metric unavailable"
        );
    }
}
