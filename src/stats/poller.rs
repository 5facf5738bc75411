use super::{SnapshotHandle, StatsClient};
use crate::metrics::{core::time_operation, StatsMetrics};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Background task that keeps the shared snapshot fresh.
pub struct StatsPoller {
    client: StatsClient,
    snapshot: SnapshotHandle,
    interval: Duration,
}

impl StatsPoller {
    pub fn new(client: StatsClient, snapshot: SnapshotHandle, interval: Duration) -> Self {
        Self {
            client,
            snapshot,
            interval,
        }
    }

    /// Fetch once and publish. A failed fetch keeps the previous snapshot.
    pub async fn refresh(&self) -> bool {
        let _timing = time_operation(StatsMetrics::fetch_duration_name());
        match self.client.stats().await {
            Ok(stats) => {
                self.snapshot.publish(stats);
                StatsMetrics::record_fetch_success();
                debug!("Stats snapshot refreshed");
                true
            }
            Err(e) => {
                StatsMetrics::record_fetch_error();
                warn!("Stats fetch failed, keeping previous snapshot: {}", e);
                false
            }
        }
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Stats poller started (every {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh().await;
                }
                _ = shutdown.changed() => break,
            }
        }

        info!("Stats poller stopped");
    }
}
