//! Scrape handling metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct ScrapeMetrics;

impl ScrapeMetrics {
    pub fn record_scrape() {
        ::metrics::counter!(phase_metric!(counter, "scrape", "requests")).increment(1);
    }

    pub fn record_encode_error() {
        ::metrics::counter!(phase_metric!(counter, "scrape", "encode_errors")).increment(1);
    }

    pub fn duration_name() -> &'static str {
        phase_metric!(histogram, "scrape", "duration_seconds")
    }
}

impl PhaseMetrics for ScrapeMetrics {
    fn register_metrics() {
        use metrics::{counter, describe_counter, describe_histogram, histogram};

        describe_counter!(
            phase_metric!(counter, "scrape", "requests"),
            "Scrapes served on /metrics"
        );
        describe_counter!(
            phase_metric!(counter, "scrape", "encode_errors"),
            "Scrapes that failed to encode the beat families"
        );
        describe_histogram!(
            phase_metric!(histogram, "scrape", "duration_seconds"),
            "Time spent collecting and encoding a scrape"
        );

        let _ = counter!(phase_metric!(counter, "scrape", "requests"));
        let _ = counter!(phase_metric!(counter, "scrape", "encode_errors"));
        let _ = histogram!(phase_metric!(histogram, "scrape", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "scrape"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "scrape", "requests"),
                metric_type: MetricType::Counter,
                help: "Scrapes served on /metrics",
            },
            MetricDoc {
                name: phase_metric!(counter, "scrape", "encode_errors"),
                metric_type: MetricType::Counter,
                help: "Scrapes that failed to encode the beat families",
            },
            MetricDoc {
                name: phase_metric!(histogram, "scrape", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Time spent collecting and encoding a scrape",
            },
        ]
    }
}
