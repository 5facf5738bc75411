//! Stats endpoint metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct StatsMetrics;

impl StatsMetrics {
    pub fn record_fetch_success() {
        ::metrics::gauge!(phase_metric!(gauge, "stats", "up")).set(1.0);
    }

    pub fn record_fetch_error() {
        ::metrics::counter!(phase_metric!(counter, "stats", "fetch_errors")).increment(1);
        ::metrics::gauge!(phase_metric!(gauge, "stats", "up")).set(0.0);
    }

    pub fn fetch_duration_name() -> &'static str {
        phase_metric!(histogram, "stats", "fetch_duration_seconds")
    }
}

impl PhaseMetrics for StatsMetrics {
    fn register_metrics() {
        use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

        for doc in Self::metrics_documentation() {
            match doc.metric_type {
                MetricType::Counter => describe_counter!(doc.name, doc.help),
                MetricType::Histogram => describe_histogram!(doc.name, doc.help),
                MetricType::Gauge => describe_gauge!(doc.name, doc.help),
            }
        }

        let _ = counter!(phase_metric!(counter, "stats", "fetch_errors"));
        let _ = gauge!(phase_metric!(gauge, "stats", "up"));
        let _ = histogram!(phase_metric!(histogram, "stats", "fetch_duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "stats"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "stats", "fetch_errors"),
                metric_type: MetricType::Counter,
                help: "Failed fetches of the beat stats endpoint",
            },
            MetricDoc {
                name: phase_metric!(gauge, "stats", "up"),
                metric_type: MetricType::Gauge,
                help: "1 if the last stats fetch succeeded, 0 otherwise",
            },
            MetricDoc {
                name: phase_metric!(histogram, "stats", "fetch_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Duration of a beat stats fetch",
            },
        ]
    }
}
