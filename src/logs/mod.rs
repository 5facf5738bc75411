//! Retrieval of the monitored process's recent log output.

pub mod docker;

pub use docker::DockerLogs;

use crate::error::Result;
use async_trait::async_trait;

/// A bounded tail request, optionally starting at a boundary token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailQuery {
    pub source: String,
    pub max_lines: usize,
    /// Inclusive lower bound understood by the log backend (a log timestamp).
    pub since: Option<String>,
}

#[async_trait]
pub trait LogSource: Send + Sync {
    /// Returns the standard-error text of the matching lines, oldest first.
    async fn tail(&self, query: &TailQuery) -> Result<String>;
}
