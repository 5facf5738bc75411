use beat_exporter::error::ExporterError;
use beat_exporter::stats::{SnapshotHandle, SnapshotSource, StatsClient, StatsPoller};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> StatsClient {
    StatsClient::new(&format!("{}/", server.uri()), Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_beat_info_is_decoded_from_root() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "beat": "filebeat",
            "hostname": "node-1",
            "name": "node-1",
            "uuid": "0d3d6c0f-7c7b-4a1c-9a7e-2b5a0f6a9e11",
            "version": "7.17.0"
        })))
        .mount(&server)
        .await;

    let info = client(&server).beat_info().await.unwrap();
    assert_eq!(info.beat, "filebeat");
    assert_eq!(info.version, "7.17.0");
}

#[tokio::test]
async fn test_stats_are_decoded_with_missing_sections() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "filebeat": { "harvester": { "open_files": 12, "running": 11 } },
            "libbeat": { "pipeline": { "events": { "active": 0 } } }
        })))
        .mount(&server)
        .await;

    let stats = client(&server).stats().await.unwrap();
    assert_eq!(stats.filebeat.harvester.open_files, 12.0);
    assert_eq!(stats.filebeat.harvester.running, 11.0);
    assert_eq!(stats.filebeat.events.active, 0.0);
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    match client(&server).stats().await {
        Err(ExporterError::Status { status, url }) => {
            assert_eq!(status, 503);
            assert!(url.ends_with("/stats"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_beat_info_retry_gives_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let result = client(&server)
        .beat_info_with_retry(2, Duration::from_millis(10))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_poller_keeps_previous_snapshot_on_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "filebeat": { "events": { "added": 10, "done": 7 } }
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let snapshot = SnapshotHandle::default();
    let poller = StatsPoller::new(client(&server), snapshot.clone(), Duration::from_secs(60));

    assert!(poller.refresh().await);
    assert_eq!(snapshot.latest().filebeat.events.added, 10.0);

    assert!(!poller.refresh().await);
    assert_eq!(snapshot.latest().filebeat.events.added, 10.0);
    assert_eq!(snapshot.latest().filebeat.events.done, 7.0);
}
