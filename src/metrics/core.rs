//! Timing helpers shared by the self-telemetry areas.

use std::time::Instant;

/// A timing guard that records its lifetime into a histogram when dropped.
pub struct TimingGuard {
    start: Instant,
    histogram_name: &'static str,
}

impl TimingGuard {
    pub fn new(histogram_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            histogram_name,
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Stop timing now instead of at end of scope.
    pub fn finish(self) {}
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        ::metrics::histogram!(self.histogram_name).record(self.elapsed_secs());
    }
}

/// Usage:
/// ```ignore
/// let _timing = time_operation("beat_exporter_harvester_scan_duration_seconds");
/// // ... do work ...
/// ```
pub fn time_operation(histogram_name: &'static str) -> TimingGuard {
    TimingGuard::new(histogram_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_timing_guard_measures_elapsed() {
        let guard = time_operation("test_metric");
        thread::sleep(Duration::from_millis(10));
        assert!(guard.elapsed_secs() >= 0.01);
        guard.finish();
    }
}
