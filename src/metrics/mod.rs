//! Exporter self-telemetry
//!
//! The beat families are served by [`crate::collector`]; this module covers
//! how the exporter itself is doing (scrapes, stats fetches, harvester scans).
//! Each area defines its metrics in a dedicated submodule and registers them
//! through [`PhaseMetrics`] so naming conflicts are caught at startup.

pub mod core;
pub mod harvester;
pub mod registry;
pub mod scrape;
pub mod stats;

pub use harvester::HarvesterMetrics;
pub use scrape::ScrapeMetrics;
pub use stats::StatsMetrics;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing::{info, warn};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder and register every self-telemetry metric.
///
/// Idempotent. No HTTP listener is started here; the exporter's own server
/// appends [`render`] to the `/metrics` response.
pub fn init_metrics() {
    if HANDLE.get().is_some() {
        return;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("Metrics recorder handle was already set");
            }
            registry::register_all_metrics();
            info!("Self-telemetry recorder installed");
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
        }
    }
}

/// Render self-telemetry in text exposition format, if the recorder is installed.
pub fn render() -> Option<String> {
    HANDLE.get().map(|h| h.render())
}

/// Trait for area-specific metrics collections
pub trait PhaseMetrics {
    /// Register (describe and pre-create) all metrics for this area
    fn register_metrics();

    /// Area name used in the metric prefix
    fn phase_name() -> &'static str;

    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
    Gauge,
}

/// Builds `beat_exporter_{phase}_{name}[_total]` at compile time.
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("beat_exporter_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("beat_exporter_", $phase, "_", $name)
    };
    (gauge, $phase:literal, $name:literal) => {
        concat!("beat_exporter_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;

#[cfg(test)]
mod tests {
    #[test]
    fn test_phase_metric_naming() {
        assert_eq!(
            phase_metric!(counter, "harvester", "scans"),
            "beat_exporter_harvester_scans_total"
        );
        assert_eq!(
            phase_metric!(histogram, "scrape", "duration_seconds"),
            "beat_exporter_scrape_duration_seconds"
        );
        assert_eq!(phase_metric!(gauge, "stats", "up"), "beat_exporter_stats_up");
    }
}
