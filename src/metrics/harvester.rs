//! Harvester error probe metrics
//!
//! Tracks how the log-tail scanner behaves: scan attempts, retrieval
//! failures, scan latency and how many lines each window carried.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct HarvesterMetrics;

impl HarvesterMetrics {
    pub fn record_scan_success(lines_scanned: usize) {
        ::metrics::counter!(phase_metric!(counter, "harvester", "scans")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "harvester", "lines_scanned"))
            .increment(lines_scanned as u64);
    }

    pub fn record_scan_failure() {
        ::metrics::counter!(phase_metric!(counter, "harvester", "scans")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "harvester", "scan_failures")).increment(1);
    }

    pub fn scan_duration_name() -> &'static str {
        phase_metric!(histogram, "harvester", "scan_duration_seconds")
    }
}

impl PhaseMetrics for HarvesterMetrics {
    fn register_metrics() {
        use metrics::{counter, describe_counter, describe_histogram, histogram};

        for doc in Self::metrics_documentation() {
            match doc.metric_type {
                MetricType::Counter => describe_counter!(doc.name, doc.help),
                MetricType::Histogram => describe_histogram!(doc.name, doc.help),
                MetricType::Gauge => {}
            }
        }

        // Pre-create so they appear in /metrics before the first scan
        let _ = counter!(phase_metric!(counter, "harvester", "scans"));
        let _ = counter!(phase_metric!(counter, "harvester", "scan_failures"));
        let _ = counter!(phase_metric!(counter, "harvester", "lines_scanned"));
        let _ = histogram!(phase_metric!(histogram, "harvester", "scan_duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "harvester"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "harvester", "scans"),
                metric_type: MetricType::Counter,
                help: "Harvester error scans attempted",
            },
            MetricDoc {
                name: phase_metric!(counter, "harvester", "scan_failures"),
                metric_type: MetricType::Counter,
                help: "Harvester error scans whose log retrieval failed or timed out",
            },
            MetricDoc {
                name: phase_metric!(counter, "harvester", "lines_scanned"),
                metric_type: MetricType::Counter,
                help: "Log lines examined by the harvester error scanner",
            },
            MetricDoc {
                name: phase_metric!(histogram, "harvester", "scan_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Duration of a harvester error scan including log retrieval",
            },
        ]
    }
}
