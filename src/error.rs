use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Beat endpoint {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Log command exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error("Log retrieval timed out after {0:?}")]
    Timeout(Duration),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("HTTP server error: {0}")]
    Server(#[from] hyper::Error),
}

pub type Result<T> = std::result::Result<T, ExporterError>;
