// Numan Thabit 2025
use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::relay::Relay;

/// Build the application router. Every path other than the service routes is
/// treated as the webhook, mirroring a single-endpoint worker.
///
/// Body size is not capped: a 413 would pre-empt the auth check and answer
/// outside the 401/405/400/200 contract.
pub fn router(relay: Relay, http_trace: bool) -> Router {
    let router = Router::new()
        .route("/healthz", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .fallback(webhook_handler)
        .layer(DefaultBodyLimit::disable())
        .with_state(relay);
    if http_trace {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

pub async fn serve(bind: SocketAddr, router: Router) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!(bind = %bind, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("axum server exited with error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received; terminating http server");
}

async fn webhook_handler(
    State(relay): State<Relay>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match relay.handle(&method, &headers, &body).await {
        Ok(()) => (StatusCode::OK, "OK").into_response(),
        Err(err) => err.into_response(),
    }
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn metrics_handler(State(relay): State<Relay>) -> impl IntoResponse {
    match relay.metrics().gather() {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}
