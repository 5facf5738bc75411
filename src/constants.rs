// Defaults shared by the config layer and the CLI

pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0:9479";
pub const DEFAULT_BEAT_URI: &str = "http://localhost:5066";
pub const DEFAULT_BEAT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_STATS_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_STARTUP_RETRIES: u32 = 5;
pub const DEFAULT_STARTUP_RETRY_DELAY_SECS: u64 = 2;
pub const DEFAULT_LOG_DIR: &str = "logs";

// Harvester error probe
pub const DEFAULT_CONTAINER: &str = "filebeat";
pub const DEFAULT_DOCKER_BIN: &str = "docker";
pub const DEFAULT_TAIL_LINES: usize = 100;
pub const DEFAULT_HARVESTER_INTERVAL_SECS: u64 = 15;
pub const DEFAULT_HARVESTER_TIMEOUT_SECS: u64 = 10;

/// Subsystem every beat family is exported under, e.g. `filebeat_filebeat_events`.
pub const FILEBEAT_SUBSYSTEM: &str = "filebeat";

/// Name reported by `/health` and used as the self-telemetry prefix.
pub const SERVICE_NAME: &str = "beat_exporter";

pub const DEFAULT_CONFIG_FILE: &str = "beat-exporter.toml";
