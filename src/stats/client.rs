use super::{BeatInfo, Stats};
use crate::error::{ExporterError, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client for the beat's monitoring endpoint.
#[derive(Debug, Clone)]
pub struct StatsClient {
    http: reqwest::Client,
    base_uri: String,
}

impl StatsClient {
    pub fn new(base_uri: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_uri: base_uri.trim_end_matches('/').to_string(),
        })
    }

    pub async fn beat_info(&self) -> Result<BeatInfo> {
        self.get_json("/").await
    }

    pub async fn stats(&self) -> Result<Stats> {
        self.get_json("/stats").await
    }

    /// Fetches the beat identity, retrying up to `retries` extra times.
    pub async fn beat_info_with_retry(&self, retries: u32, delay: Duration) -> Result<BeatInfo> {
        let mut attempt = 0;
        loop {
            match self.beat_info().await {
                Ok(info) => return Ok(info),
                Err(e) if attempt < retries => {
                    attempt += 1;
                    warn!(
                        "Beat info fetch failed (attempt {}/{}): {}",
                        attempt,
                        retries + 1,
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_uri, path);
        debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExporterError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
