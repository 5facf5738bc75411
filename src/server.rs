use crate::constants::SERVICE_NAME;
use crate::error::Result;
use crate::harvester::ErrorCountHandle;
use crate::metrics::{core::time_operation, ScrapeMetrics};
use crate::stats::BeatInfo;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use hyper::Server;
use prometheus::{Encoder, Registry, TextEncoder};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Everything the HTTP handlers read. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub registry: Registry,
    pub harvester: ErrorCountHandle,
    pub beat: Arc<BeatInfo>,
}

/// Encode the beat families, followed by the exporter's own telemetry.
pub fn encode_metrics(registry: &Registry) -> Result<String> {
    let encoder = TextEncoder::new();
    let families = registry.gather();
    let mut buf = Vec::new();
    encoder.encode(&families, &mut buf)?;

    let mut body = String::from_utf8_lossy(&buf).into_owned();
    if let Some(self_metrics) = crate::metrics::render() {
        body.push_str(&self_metrics);
    }
    Ok(body)
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    ScrapeMetrics::record_scrape();
    let _timing = time_operation(ScrapeMetrics::duration_name());

    match encode_metrics(&state.registry) {
        Ok(body) => (
            [(header::CONTENT_TYPE, TextEncoder::new().format_type().to_string())],
            body,
        )
            .into_response(),
        Err(e) => {
            ScrapeMetrics::record_encode_error();
            error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "beat": {
            "beat": state.beat.beat,
            "name": state.beat.name,
            "version": state.beat.version,
        },
        "harvester": state.harvester.report(),
    }))
}

async fn index() -> Html<&'static str> {
    Html(
        r#"<html>
<head><title>Beat Exporter</title></head>
<body>
<h1>Beat Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
<p><a href="/health">Health</a></p>
</body>
</html>"#,
    )
}

pub fn create_server(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn start_server<F>(state: AppState, addr: SocketAddr, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_server(state);

    info!("HTTP server listening on http://{}", addr);
    info!("Metrics: http://{}/metrics", addr);

    Server::try_bind(&addr)?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("HTTP server stopped");
    Ok(())
}
