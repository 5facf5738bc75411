//! Beat stats snapshot and the handle the collector reads it through.
//!
//! The beat exposes its runtime counters over HTTP (`/` for identity,
//! `/stats` for counters). A background [`StatsPoller`] refreshes a
//! [`SnapshotHandle`]; scrapes only ever read the latest published value.

pub mod client;
pub mod poller;

pub use client::StatsClient;
pub use poller::StatsPoller;

use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::watch;

/// Identity of the monitored beat, from the root of its HTTP endpoint.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct BeatInfo {
    pub beat: String,
    pub hostname: String,
    pub name: String,
    pub uuid: String,
    pub version: String,
}

/// Point-in-time stats document. Only the filebeat section is exported.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Stats {
    pub filebeat: Filebeat,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Filebeat {
    pub events: Events,
    pub harvester: Harvester,
    pub input: Input,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Events {
    pub active: f64,
    pub added: f64,
    pub done: f64,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Harvester {
    pub closed: f64,
    pub open_files: f64,
    pub running: f64,
    pub skipped: f64,
    pub started: f64,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Input {
    pub log: InputLog,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputLog {
    pub files: InputLogFiles,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputLogFiles {
    pub renamed: f64,
    pub truncated: f64,
}

/// Read side of the current stats snapshot.
pub trait SnapshotSource: Send + Sync {
    fn latest(&self) -> Arc<Stats>;
}

/// Atomically swappable snapshot shared between the poller and scrapes.
#[derive(Debug, Clone)]
pub struct SnapshotHandle {
    tx: Arc<watch::Sender<Arc<Stats>>>,
}

impl SnapshotHandle {
    pub fn new(initial: Stats) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self { tx: Arc::new(tx) }
    }

    pub fn publish(&self, stats: Stats) {
        self.tx.send_replace(Arc::new(stats));
    }
}

impl Default for SnapshotHandle {
    fn default() -> Self {
        Self::new(Stats::default())
    }
}

impl SnapshotSource for SnapshotHandle {
    fn latest(&self) -> Arc<Stats> {
        self.tx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_stats_document() {
        let doc = json!({
            "beat": { "memstats": { "rss": 1024 } },
            "filebeat": {
                "events": { "active": 3, "added": 10, "done": 7 },
                "harvester": {
                    "closed": 1, "open_files": 2, "running": 1,
                    "skipped": 0, "started": 2
                },
                "input": { "log": { "files": { "renamed": 0, "truncated": 1 } } }
            },
            "libbeat": { "output": { "type": "elasticsearch" } }
        });

        let stats: Stats = serde_json::from_value(doc).unwrap();
        assert_eq!(stats.filebeat.events.active, 3.0);
        assert_eq!(stats.filebeat.events.added, 10.0);
        assert_eq!(stats.filebeat.harvester.open_files, 2.0);
        assert_eq!(stats.filebeat.input.log.files.truncated, 1.0);
    }

    #[test]
    fn test_absent_fields_decode_as_zero() {
        let stats: Stats =
            serde_json::from_value(json!({ "filebeat": { "events": { "added": 4 } } })).unwrap();
        assert_eq!(stats.filebeat.events.added, 4.0);
        assert_eq!(stats.filebeat.events.active, 0.0);
        assert_eq!(stats.filebeat.harvester, Harvester::default());
        assert_eq!(stats.filebeat.input.log.files.renamed, 0.0);
    }

    #[test]
    fn test_snapshot_handle_swaps_whole_snapshot() {
        let handle = SnapshotHandle::default();
        let before = handle.latest();

        let mut next = Stats::default();
        next.filebeat.events.done = 42.0;
        handle.publish(next);

        assert_eq!(before.filebeat.events.done, 0.0);
        assert_eq!(handle.latest().filebeat.events.done, 42.0);
        assert_eq!(handle.clone().latest().filebeat.events.done, 42.0);
    }
}
