use super::{ErrorCountHandle, HarvesterErrorScanner};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::info;

/// Owns the scanner and publishes its count after every scan.
///
/// Scrapes never drive the scanner; they read the last published report.
pub struct HarvesterPoller {
    scanner: HarvesterErrorScanner,
    handle: ErrorCountHandle,
    interval: Duration,
}

impl HarvesterPoller {
    pub fn new(scanner: HarvesterErrorScanner, handle: ErrorCountHandle, interval: Duration) -> Self {
        Self {
            scanner,
            handle,
            interval,
        }
    }

    pub async fn poll_once(&mut self) -> u64 {
        let count = self.scanner.scan().await;
        self.handle.publish(self.scanner.report());
        count
    }

    /// Scan immediately, then every interval, until shutdown.
    ///
    /// Shutdown during a scan drops it, which kills the retrieval process.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Harvester error poller started (every {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }

            tokio::select! {
                _ = self.poll_once() => {}
                _ = shutdown.changed() => {
                    info!("Shutdown requested during harvester scan");
                    break;
                }
            }
        }

        info!(
            "Harvester error poller stopped at count {}",
            self.handle.error_count()
        );
    }
}
