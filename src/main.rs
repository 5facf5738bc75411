use beat_exporter::config::ExporterConfig;
use beat_exporter::constants::DEFAULT_CONFIG_FILE;
use beat_exporter::exporter::{shutdown_signal, Exporter};
use beat_exporter::{logging, metrics};
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "beat-exporter")]
#[command(about = "Prometheus exporter for Filebeat stats and harvester read errors")]
#[command(version)]
struct Cli {
    /// TOML config file (default: ./beat-exporter.toml if present)
    #[arg(long, env = "BEAT_EXPORTER_CONFIG")]
    config: Option<PathBuf>,

    /// Address to serve /metrics on
    #[arg(long, env = "BEAT_EXPORTER_LISTEN_ADDRESS")]
    listen_address: Option<String>,

    /// Base URI of the beat's HTTP monitoring endpoint
    #[arg(long, env = "BEAT_EXPORTER_BEAT_URI")]
    beat_uri: Option<String>,

    #[arg(long, env = "BEAT_EXPORTER_BEAT_TIMEOUT_SECS")]
    beat_timeout_secs: Option<u64>,

    #[arg(long, env = "BEAT_EXPORTER_STATS_INTERVAL_SECS")]
    stats_interval_secs: Option<u64>,

    /// Metric namespace (default: the beat's own name)
    #[arg(long, env = "BEAT_EXPORTER_NAMESPACE")]
    namespace: Option<String>,

    /// Container whose logs are scanned for harvester read errors
    #[arg(long, env = "BEAT_EXPORTER_CONTAINER")]
    container: Option<String>,

    #[arg(long, env = "BEAT_EXPORTER_DOCKER_BIN")]
    docker_bin: Option<String>,

    /// Maximum log lines fetched per scan
    #[arg(long, env = "BEAT_EXPORTER_TAIL_LINES")]
    tail_lines: Option<usize>,

    #[arg(long, env = "BEAT_EXPORTER_HARVESTER_INTERVAL_SECS")]
    harvester_interval_secs: Option<u64>,

    #[arg(long, env = "BEAT_EXPORTER_HARVESTER_TIMEOUT_SECS")]
    harvester_timeout_secs: Option<u64>,

    /// Do not scan logs; harvester errors report 0
    #[arg(long, env = "BEAT_EXPORTER_DISABLE_HARVESTER_ERRORS")]
    disable_harvester_errors: bool,

    #[arg(long, env = "BEAT_EXPORTER_LOG_DIR")]
    log_dir: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut ExporterConfig) {
        if let Some(v) = &self.listen_address {
            config.listen_address = v.clone();
        }
        if let Some(v) = &self.beat_uri {
            config.beat_uri = v.clone();
        }
        if let Some(v) = self.beat_timeout_secs {
            config.beat_timeout_secs = v;
        }
        if let Some(v) = self.stats_interval_secs {
            config.stats_interval_secs = v;
        }
        if let Some(v) = &self.namespace {
            config.namespace = Some(v.clone());
        }
        if let Some(v) = &self.container {
            config.harvester.container = v.clone();
        }
        if let Some(v) = &self.docker_bin {
            config.harvester.docker_bin = v.clone();
        }
        if let Some(v) = self.tail_lines {
            config.harvester.tail_lines = v;
        }
        if let Some(v) = self.harvester_interval_secs {
            config.harvester.interval_secs = v;
        }
        if let Some(v) = self.harvester_timeout_secs {
            config.harvester.timeout_secs = v;
        }
        if self.disable_harvester_errors {
            config.harvester.enabled = false;
        }
        if let Some(v) = &self.log_dir {
            config.log_dir = v.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ExporterConfig::load_from(path)?,
        None => ExporterConfig::load_or_default(DEFAULT_CONFIG_FILE)?,
    };
    cli.apply(&mut config);
    config.validate()?;

    let _log_guard = logging::init_logging(&config.log_dir);
    metrics::init_metrics();
    info!("Starting beat-exporter {}", env!("CARGO_PKG_VERSION"));

    let exporter = Exporter::build(&config).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    exporter.run(config.listen_addr()?, shutdown_rx).await?;
    info!("beat-exporter stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_file_values() {
        let cli = Cli::parse_from([
            "beat-exporter",
            "--beat-uri",
            "http://beat:5066",
            "--tail-lines",
            "500",
            "--disable-harvester-errors",
        ]);
        let mut config = ExporterConfig::default();
        config.namespace = Some("from_file".into());
        cli.apply(&mut config);

        assert_eq!(config.beat_uri, "http://beat:5066");
        assert_eq!(config.harvester.tail_lines, 500);
        assert!(!config.harvester.enabled);
        assert_eq!(config.namespace.as_deref(), Some("from_file"));
    }
}
