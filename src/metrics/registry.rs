//! Registration of every self-telemetry area, with early conflict detection.

use crate::metrics::{MetricDoc, PhaseMetrics};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Register all areas and warn about duplicate metric names.
pub fn register_all_metrics() {
    let all_metrics = collect_documentation(true);
    info!("Registered {} self-telemetry metrics", all_metrics.len());

    for doc in all_metrics.values() {
        debug!(
            "  - {} [{}] ({:?}): {}",
            doc.name,
            extract_phase_from_metric_name(doc.name),
            doc.metric_type,
            doc.help
        );
    }
}

fn collect_documentation(register: bool) -> HashMap<&'static str, MetricDoc> {
    let mut all_metrics = HashMap::new();
    add_phase::<super::ScrapeMetrics>(&mut all_metrics, register);
    add_phase::<super::StatsMetrics>(&mut all_metrics, register);
    add_phase::<super::HarvesterMetrics>(&mut all_metrics, register);
    all_metrics
}

fn add_phase<T: PhaseMetrics>(all_metrics: &mut HashMap<&'static str, MetricDoc>, register: bool) {
    if register {
        T::register_metrics();
    }
    let phase_name = T::phase_name();

    for doc in T::metrics_documentation() {
        if let Some(existing) = all_metrics.get(doc.name) {
            warn!(
                "Metric name conflict: '{}' is defined by '{}' and '{}'",
                doc.name,
                extract_phase_from_metric_name(existing.name),
                phase_name
            );
        } else {
            all_metrics.insert(doc.name, doc);
        }
    }
}

/// "beat_exporter_harvester_scans_total" -> "harvester"
fn extract_phase_from_metric_name(metric_name: &str) -> &str {
    if let Some(stripped) = metric_name.strip_prefix("beat_exporter_") {
        if let Some(next_underscore) = stripped.find('_') {
            return &stripped[..next_underscore];
        }
    }
    "unknown"
}
