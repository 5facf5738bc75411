//! Assembly of the exporter: collector, pollers and HTTP server.

use crate::collector::FilebeatCollector;
use crate::config::ExporterConfig;
use crate::error::{ExporterError, Result};
use crate::harvester::{ErrorCountHandle, HarvesterErrorScanner, HarvesterPoller};
use crate::logs::{DockerLogs, LogSource};
use crate::server::{start_server, AppState};
use crate::stats::{BeatInfo, SnapshotHandle, StatsClient, StatsPoller};
use prometheus::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

pub struct Exporter {
    state: AppState,
    stats_poller: StatsPoller,
    harvester_poller: Option<HarvesterPoller>,
}

impl Exporter {
    /// Resolve the beat identity and build against the real beat and docker.
    pub async fn build(config: &ExporterConfig) -> Result<Self> {
        let client = StatsClient::new(&config.beat_uri, config.beat_timeout())?;

        let beat = match client
            .beat_info_with_retry(config.startup_retries, config.startup_retry_delay())
            .await
        {
            Ok(info) => {
                info!(
                    "Monitoring {} {} ({}) at {}",
                    info.beat, info.version, info.name, config.beat_uri
                );
                info
            }
            Err(e) if config.namespace.is_some() => {
                warn!(
                    "Beat info unavailable, continuing with configured namespace: {}",
                    e
                );
                BeatInfo::default()
            }
            Err(e) => return Err(e),
        };

        let logs = DockerLogs::new(&config.harvester.docker_bin, config.harvester.timeout());
        Self::new(config, beat, client, Box::new(logs))
    }

    pub fn new(
        config: &ExporterConfig,
        beat: BeatInfo,
        client: StatsClient,
        logs: Box<dyn LogSource>,
    ) -> Result<Self> {
        let namespace = config
            .namespace
            .clone()
            .unwrap_or_else(|| beat.beat.clone());
        if namespace.trim().is_empty() {
            return Err(ExporterError::Config(
                "beat reported no name; set `namespace` explicitly".into(),
            ));
        }

        let snapshot = SnapshotHandle::default();
        let harvester = ErrorCountHandle::new();

        let collector = FilebeatCollector::new(
            &namespace,
            Arc::new(snapshot.clone()),
            Arc::new(harvester.clone()),
        )?;
        let registry = Registry::new();
        registry.register(Box::new(collector))?;

        let stats_poller = StatsPoller::new(client, snapshot, config.stats_interval());

        let harvester_poller = if config.harvester.enabled {
            let scanner = HarvesterErrorScanner::new(
                logs,
                config.harvester.container.clone(),
                config.harvester.tail_lines,
            );
            Some(HarvesterPoller::new(
                scanner,
                harvester.clone(),
                config.harvester.interval(),
            ))
        } else {
            info!("Harvester error probe disabled; errors will report 0");
            None
        };

        Ok(Self {
            state: AppState {
                registry,
                harvester,
                beat: Arc::new(beat),
            },
            stats_poller,
            harvester_poller,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run pollers and the HTTP server until `shutdown` flips to true.
    pub async fn run(self, addr: SocketAddr, shutdown: watch::Receiver<bool>) -> Result<()> {
        let mut tasks = vec![tokio::spawn(self.stats_poller.run(shutdown.clone()))];
        if let Some(poller) = self.harvester_poller {
            tasks.push(tokio::spawn(poller.run(shutdown.clone())));
        }

        let mut server_shutdown = shutdown.clone();
        let signal = async move {
            let _ = server_shutdown.wait_for(|stop| *stop).await;
        };
        start_server(self.state, addr, signal).await?;

        for task in tasks {
            if let Err(e) = task.await {
                warn!("Background task ended abnormally: {}", e);
            }
        }
        Ok(())
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Shutdown signal received");
}
