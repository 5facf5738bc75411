use crate::constants::*;
use crate::error::{ExporterError, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Exporter configuration, loaded from TOML and then overridden by CLI flags.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    pub listen_address: String,
    pub beat_uri: String,
    pub beat_timeout_secs: u64,
    pub stats_interval_secs: u64,
    /// Metric namespace; falls back to the beat name reported by the beat itself.
    pub namespace: Option<String>,
    pub startup_retries: u32,
    pub startup_retry_delay_secs: u64,
    pub log_dir: String,
    pub harvester: HarvesterConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvesterConfig {
    pub enabled: bool,
    pub container: String,
    pub docker_bin: String,
    pub tail_lines: usize,
    pub interval_secs: u64,
    pub timeout_secs: u64,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen_address: DEFAULT_LISTEN_ADDRESS.to_string(),
            beat_uri: DEFAULT_BEAT_URI.to_string(),
            beat_timeout_secs: DEFAULT_BEAT_TIMEOUT_SECS,
            stats_interval_secs: DEFAULT_STATS_INTERVAL_SECS,
            namespace: None,
            startup_retries: DEFAULT_STARTUP_RETRIES,
            startup_retry_delay_secs: DEFAULT_STARTUP_RETRY_DELAY_SECS,
            log_dir: DEFAULT_LOG_DIR.to_string(),
            harvester: HarvesterConfig::default(),
        }
    }
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            container: DEFAULT_CONTAINER.to_string(),
            docker_bin: DEFAULT_DOCKER_BIN.to_string(),
            tail_lines: DEFAULT_TAIL_LINES,
            interval_secs: DEFAULT_HARVESTER_INTERVAL_SECS,
            timeout_secs: DEFAULT_HARVESTER_TIMEOUT_SECS,
        }
    }
}

impl ExporterConfig {
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ExporterError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: ExporterConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads `path` when it exists, otherwise returns the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load_from(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;

        let uri = reqwest::Url::parse(&self.beat_uri).map_err(|e| {
            ExporterError::Config(format!("Invalid beat_uri '{}': {}", self.beat_uri, e))
        })?;
        if !matches!(uri.scheme(), "http" | "https") {
            return Err(ExporterError::Config(format!(
                "beat_uri must be http or https, got '{}'",
                uri.scheme()
            )));
        }

        if self.beat_timeout_secs == 0 {
            return Err(ExporterError::Config("beat_timeout_secs must be > 0".into()));
        }
        if self.stats_interval_secs == 0 {
            return Err(ExporterError::Config("stats_interval_secs must be > 0".into()));
        }
        if let Some(ns) = &self.namespace {
            if ns.trim().is_empty() {
                return Err(ExporterError::Config("namespace must not be empty".into()));
            }
        }

        let h = &self.harvester;
        if h.container.trim().is_empty() {
            return Err(ExporterError::Config("harvester.container must not be empty".into()));
        }
        if h.tail_lines == 0 {
            return Err(ExporterError::Config("harvester.tail_lines must be > 0".into()));
        }
        if h.interval_secs == 0 || h.timeout_secs == 0 {
            return Err(ExporterError::Config(
                "harvester.interval_secs and harvester.timeout_secs must be > 0".into(),
            ));
        }

        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen_address.parse().map_err(|e| {
            ExporterError::Config(format!(
                "Invalid listen_address '{}': {}",
                self.listen_address, e
            ))
        })
    }

    pub fn beat_timeout(&self) -> Duration {
        Duration::from_secs(self.beat_timeout_secs)
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }

    pub fn startup_retry_delay(&self) -> Duration {
        Duration::from_secs(self.startup_retry_delay_secs)
    }
}

impl HarvesterConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = ExporterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.harvester.tail_lines, 100);
        assert_eq!(config.harvester.container, "filebeat");
        assert_eq!(config.listen_addr().unwrap().port(), 9479);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
beat_uri = "http://beat:5066"
namespace = "edge"

[harvester]
container = "filebeat-01"
tail_lines = 250
"#
        )
        .unwrap();

        let config = ExporterConfig::load_from(file.path()).unwrap();
        assert_eq!(config.beat_uri, "http://beat:5066");
        assert_eq!(config.namespace.as_deref(), Some("edge"));
        assert_eq!(config.harvester.container, "filebeat-01");
        assert_eq!(config.harvester.tail_lines, 250);
        assert_eq!(config.harvester.interval_secs, DEFAULT_HARVESTER_INTERVAL_SECS);
        assert_eq!(config.stats_interval_secs, DEFAULT_STATS_INTERVAL_SECS);
        assert!(config.harvester.enabled);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExporterConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.beat_uri, DEFAULT_BEAT_URI);
    }

    #[test]
    fn test_load_from_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ExporterConfig::load_from(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ExporterError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ExporterConfig::default();
        config.harvester.tail_lines = 0;
        assert!(config.validate().is_err());

        let mut config = ExporterConfig::default();
        config.beat_uri = "not a uri".to_string();
        assert!(config.validate().is_err());

        let mut config = ExporterConfig::default();
        config.beat_uri = "ftp://beat:21".to_string();
        assert!(config.validate().is_err());

        let mut config = ExporterConfig::default();
        config.listen_address = "localhost".to_string();
        assert!(config.validate().is_err());

        let mut config = ExporterConfig::default();
        config.harvester.container = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = ExporterConfig::default();
        config.stats_interval_secs = 0;
        assert!(config.validate().is_err());
    }
}
