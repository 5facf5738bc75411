use super::{LogSource, TailQuery};
use crate::error::{ExporterError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Reads container logs through `docker logs`.
///
/// The child is killed if the returned future is dropped, so a cancelled
/// scan never leaves a `docker logs` process behind.
#[derive(Debug, Clone)]
pub struct DockerLogs {
    docker_bin: String,
    timeout: Duration,
}

impl DockerLogs {
    pub fn new(docker_bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            docker_bin: docker_bin.into(),
            timeout,
        }
    }

    pub fn args(query: &TailQuery) -> Vec<String> {
        let mut args = vec![
            "logs".to_string(),
            query.source.clone(),
            "--tail".to_string(),
            query.max_lines.to_string(),
        ];
        if let Some(since) = query.since.as_deref().filter(|s| !s.is_empty()) {
            args.push("--since".to_string());
            args.push(since.to_string());
        }
        args
    }
}

#[async_trait]
impl LogSource for DockerLogs {
    async fn tail(&self, query: &TailQuery) -> Result<String> {
        let args = Self::args(query);
        debug!("Executing: {} {:?}", self.docker_bin, args);

        let child = Command::new(&self.docker_bin)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| ExporterError::Timeout(self.timeout))??;

        // The beat logs to stderr, which docker replays on stderr too
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(ExporterError::CommandFailed {
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(stderr)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    fn fake_docker(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("docker");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn query(since: Option<&str>) -> TailQuery {
        TailQuery {
            source: "filebeat".to_string(),
            max_lines: 100,
            since: since.map(str::to_string),
        }
    }

    #[test]
    fn test_args_without_watermark_omit_since() {
        assert_eq!(
            DockerLogs::args(&query(None)),
            vec!["logs", "filebeat", "--tail", "100"]
        );
        assert_eq!(
            DockerLogs::args(&query(Some(""))),
            vec!["logs", "filebeat", "--tail", "100"]
        );
    }

    #[test]
    fn test_args_with_watermark() {
        assert_eq!(
            DockerLogs::args(&query(Some("2024-01-01T00:00:01"))),
            vec!["logs", "filebeat", "--tail", "100", "--since", "2024-01-01T00:00:01"]
        );
    }

    #[tokio::test]
    async fn test_tail_returns_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let bin = fake_docker(&dir, r#"echo "stdout noise"; echo "$@" >&2"#);
        let logs = DockerLogs::new(bin.to_string_lossy(), Duration::from_secs(5));

        let out = logs.tail(&query(Some("T1"))).await.unwrap();
        assert_eq!(out.trim(), "logs filebeat --tail 100 --since T1");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_command_failure() {
        let dir = tempfile::tempdir().unwrap();
        let bin = fake_docker(&dir, r#"echo "No such container: filebeat" >&2; exit 1"#);
        let logs = DockerLogs::new(bin.to_string_lossy(), Duration::from_secs(5));

        match logs.tail(&query(None)).await {
            Err(ExporterError::CommandFailed { stderr, .. }) => {
                assert_eq!(stderr, "No such container: filebeat")
            }
            other => panic!("expected CommandFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_command_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let bin = fake_docker(&dir, "sleep 5");
        let logs = DockerLogs::new(bin.to_string_lossy(), Duration::from_millis(100));

        let err = logs.tail(&query(None)).await.unwrap_err();
        assert!(matches!(err, ExporterError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_missing_binary_is_io_error() {
        let logs = DockerLogs::new("/nonexistent/docker-binary", Duration::from_secs(1));
        let err = logs.tail(&query(None)).await.unwrap_err();
        assert!(matches!(err, ExporterError::Io(_)));
    }
}
