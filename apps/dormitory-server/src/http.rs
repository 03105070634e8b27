use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, Request},
    response::Json,
    routing::get,
    Router,
};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::field::Empty;

use dormitory::Dormitory;
use runtime::ServerConfig;

const BODY_LIMIT_BYTES: usize = 1024 * 1024;

pub fn request_id_header() -> HeaderName {
    HeaderName::from_static("x-request-id")
}

#[derive(Clone, Default)]
pub struct MakeReqId;

impl MakeRequestId for MakeReqId {
    fn make_request_id<B>(&mut self, _req: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        Some(RequestId::new(id.parse().ok()?))
    }
}

fn make_span(req: &Request<Body>) -> tracing::Span {
    let rid = req
        .headers()
        .get(request_id_header())
        .and_then(|v| v.to_str().ok())
        .unwrap_or("n/a");
    tracing::info_span!(
        "http_request",
        method = %req.method(),
        uri = %req.uri().path(),
        request_id = %rid,
        status = Empty,
        latency_ms = Empty
    )
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Module routes plus `/health`, wrapped in the standard middleware stack.
pub fn build_router(module: &Dormitory, server: &ServerConfig) -> anyhow::Result<Router> {
    let mut router = module.register_rest(Router::new().route("/health", get(health)))?;

    // Layers added later wrap the earlier ones, so the request passes
    // SetRequestId -> PropagateRequestId -> Trace -> Timeout -> CORS -> BodyLimit.
    router = router.layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES));
    if server.cors_enabled {
        router = router.layer(CorsLayer::permissive());
    }
    if server.timeout_sec > 0 {
        router = router.layer(TimeoutLayer::new(Duration::from_secs(server.timeout_sec)));
    }
    router = router.layer(TraceLayer::new_for_http().make_span_with(make_span));
    router = router.layer(PropagateRequestIdLayer::new(request_id_header()));
    router = router.layer(SetRequestIdLayer::new(request_id_header(), MakeReqId));

    Ok(router)
}

/// Bind and serve until SIGINT/SIGTERM, then drain in-flight requests.
pub async fn serve(router: Router, server: &ServerConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", server.host, server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address '{}:{}': {}", server.host, server.port, e))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server bound on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!(e))
}

async fn shutdown_signal() {
    match wait_for_signal().await {
        Ok(()) => tracing::info!("shutdown: signal received"),
        Err(e) => {
            tracing::warn!(error = %e, "shutdown: signal handler failed; falling back to ctrl_c()");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => {},
        _ = sigint.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use sea_orm::{ConnectOptions, Database};
    use std::sync::Arc;
    use tower::util::ServiceExt; // for `oneshot`

    async fn test_app() -> Router {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1).min_connections(1);
        let db = Database::connect(opts).await.unwrap();
        dormitory::migrate(&db).await.unwrap();
        let hasher = dormitory::infra::password::Argon2PasswordHasher::with_cost(256, 1).unwrap();
        let module = Dormitory::new(db, Default::default(), Arc::new(hasher));
        build_router(&module, &ServerConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn generates_request_id_when_missing() {
        let response = test_app()
            .await
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let rid = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(uuid::Uuid::parse_str(rid).is_ok(), "got '{rid}'");
    }

    #[tokio::test]
    async fn preserves_incoming_request_id() {
        let response = test_app()
            .await
            .oneshot(
                Request::builder()
                    .uri("/dormitory/v1/rooms")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
            Some("abc-123")
        );
    }

    #[tokio::test]
    async fn oversized_bodies_are_refused() {
        let body = vec![b' '; BODY_LIMIT_BYTES + 1];
        let response = test_app()
            .await
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/dormitory/v1/rooms")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
