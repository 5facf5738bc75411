//! Harvester read-error detection.
//!
//! The beat does not report harvester read errors in its stats, so they are
//! derived from its recent log output. [`HarvesterErrorScanner`] tails the log
//! from the last detected error (the watermark), counts new error lines and
//! keeps a cumulative counter. Only one task owns a scanner; everybody else
//! reads the published [`HarvesterReport`] through an [`ErrorCountHandle`].

pub mod poller;
pub mod signature;

pub use poller::HarvesterPoller;

use crate::logs::{LogSource, TailQuery};
use crate::metrics::{core::time_operation, HarvesterMetrics};
use chrono::{DateTime, Utc};
use serde::Serialize;
use signature::LineClass;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Watermark and counter carried across scans for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct ScannerState {
    watermark: Option<String>,
    error_count: u64,
    /// Tail of the previous window that the next retrieval can return again.
    carried_lines: Vec<String>,
}

/// What one window of log output contributed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub lines: usize,
    pub counted: u64,
    pub skipped_duplicates: usize,
    pub unparseable: usize,
}

impl ScannerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watermark(&self) -> Option<&str> {
        self.watermark.as_deref()
    }

    pub fn error_count(&self) -> u64 {
        self.error_count
    }

    /// Count the read errors in `output` that were not counted before.
    ///
    /// Lines must be in chronological order. An error whose token is at or
    /// before the watermark held on entry was already counted by an earlier
    /// window. Errors without a token are matched by position instead: those
    /// inside the prefix shared with the end of the previous window are
    /// repeats. The watermark only moves forward.
    pub fn scan_output(&mut self, output: &str) -> ScanOutcome {
        let boundary = self.watermark.clone();
        let lines: Vec<&str> = output.lines().collect();
        let overlap = overlap_len(&self.carried_lines, &lines);
        let mut outcome = ScanOutcome {
            lines: lines.len(),
            ..Default::default()
        };
        // Newest token counted in this window and the line it first appears on
        let mut newest: Option<(&str, usize)> = None;

        for (i, &line) in lines.iter().enumerate() {
            match signature::classify(line) {
                LineClass::NotAnError => {}
                LineClass::Error { token } => {
                    if boundary.as_deref().is_some_and(|w| token <= w) {
                        outcome.skipped_duplicates += 1;
                        continue;
                    }
                    outcome.counted += 1;
                    debug!(token, "Harvester read error detected");
                    if newest.map_or(true, |(n, _)| token > n) {
                        newest = Some((token, i));
                    }
                }
                LineClass::UnparseableError => {
                    outcome.unparseable += 1;
                    if i < overlap {
                        outcome.skipped_duplicates += 1;
                    } else {
                        outcome.counted += 1;
                        warn!("Harvester read error without a leading token: {}", line);
                    }
                }
            }
        }

        self.error_count += outcome.counted;

        // The next retrieval starts at the watermark line
        let carry_from = match newest {
            Some((token, at)) => {
                self.watermark = Some(token.to_string());
                at
            }
            None => 0,
        };
        self.carried_lines = lines[carry_from..].iter().map(|l| l.to_string()).collect();

        outcome
    }
}

/// Longest suffix of `previous` that is also a prefix of `current`.
fn overlap_len(previous: &[String], current: &[&str]) -> usize {
    let max = previous.len().min(current.len());
    (1..=max)
        .rev()
        .find(|&k| {
            previous[previous.len() - k..]
                .iter()
                .zip(&current[..k])
                .all(|(prev, cur)| prev.as_str() == *cur)
        })
        .unwrap_or(0)
}

/// Snapshot of the scanner published after every scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HarvesterReport {
    pub error_count: u64,
    pub watermark: Option<String>,
    pub last_scan_ok: Option<bool>,
    pub last_scan_at: Option<DateTime<Utc>>,
}

/// Read side of the published harvester error counter. Readers never wait
/// on the poller.
#[derive(Debug, Clone)]
pub struct ErrorCountHandle {
    tx: Arc<watch::Sender<HarvesterReport>>,
}

impl ErrorCountHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(HarvesterReport::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn publish(&self, report: HarvesterReport) {
        self.tx.send_replace(report);
    }

    pub fn report(&self) -> HarvesterReport {
        self.tx.borrow().clone()
    }

    pub fn error_count(&self) -> u64 {
        self.tx.borrow().error_count
    }
}

impl Default for ErrorCountHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Tails the beat's log and maintains the cumulative read-error count.
///
/// All mutation goes through `&mut self`, so scans are serialized by
/// ownership rather than by a lock.
pub struct HarvesterErrorScanner {
    source: Box<dyn LogSource>,
    container: String,
    tail_lines: usize,
    state: ScannerState,
    last_scan_ok: Option<bool>,
    last_scan_at: Option<DateTime<Utc>>,
}

impl HarvesterErrorScanner {
    pub fn new(source: Box<dyn LogSource>, container: impl Into<String>, tail_lines: usize) -> Self {
        Self {
            source,
            container: container.into(),
            tail_lines,
            state: ScannerState::new(),
            last_scan_ok: None,
            last_scan_at: None,
        }
    }

    pub fn state(&self) -> &ScannerState {
        &self.state
    }

    pub fn query(&self) -> TailQuery {
        TailQuery {
            source: self.container.clone(),
            max_lines: self.tail_lines,
            since: self.state.watermark.clone(),
        }
    }

    /// Retrieve the next window and return the up-to-date cumulative count.
    ///
    /// A failed retrieval leaves the state untouched and returns the last
    /// known count.
    pub async fn scan(&mut self) -> u64 {
        let _timing = time_operation(HarvesterMetrics::scan_duration_name());
        let query = self.query();
        self.last_scan_at = Some(Utc::now());

        let output = match self.source.tail(&query).await {
            Ok(output) => output,
            Err(e) => {
                HarvesterMetrics::record_scan_failure();
                self.last_scan_ok = Some(false);
                warn!(
                    container = %self.container,
                    "Harvester log retrieval failed, keeping count {}: {}",
                    self.state.error_count,
                    e
                );
                return self.state.error_count;
            }
        };

        let outcome = self.state.scan_output(&output);
        HarvesterMetrics::record_scan_success(outcome.lines);
        self.last_scan_ok = Some(true);

        if outcome.counted > 0 {
            info!(
                container = %self.container,
                new_errors = outcome.counted,
                total = self.state.error_count,
                watermark = ?self.state.watermark,
                "Harvester read errors detected"
            );
        } else {
            debug!(
                lines = outcome.lines,
                skipped = outcome.skipped_duplicates,
                "No new harvester read errors"
            );
        }

        self.state.error_count
    }

    pub fn report(&self) -> HarvesterReport {
        HarvesterReport {
            error_count: self.state.error_count,
            watermark: self.state.watermark.clone(),
            last_scan_ok: self.last_scan_ok,
            last_scan_at: self.last_scan_at,
        }
    }
}
