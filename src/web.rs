//! Read-only HTTP API over the latest poll snapshot

use crate::error::{Result, ZeverError};
use crate::runtime::{APP_VERSION, SnapshotReceiver};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub snapshot_rx: SnapshotReceiver,
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Latest snapshot, or 503 until the first poll has finished
pub async fn status(State(state): State<AppState>) -> Response {
    let snapshot = state.snapshot_rx.borrow().clone();
    match snapshot {
        Some(snapshot) => Json(&*snapshot).into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"error": "no poll has completed yet"})),
        )
            .into_response(),
    }
}

pub async fn version() -> impl IntoResponse {
    Json(serde_json::json!({"version": APP_VERSION}))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/status", get(status))
        .route("/api/version", get(version))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind the status API listener; an unparseable host falls back to loopback
pub async fn bind(host: &str, port: u16) -> Result<TcpListener> {
    let logger = crate::logging::get_logger("web");

    let addr = match host.parse::<IpAddr>() {
        Ok(ip) => SocketAddr::new(ip, port),
        Err(_) => {
            logger.warn(&format!("Invalid host '{}'; falling back to 127.0.0.1", host));
            ([127, 0, 0, 1], port).into()
        }
    };
    logger.info(&format!("Binding web server to {}", addr));

    TcpListener::bind(addr)
        .await
        .map_err(|e| ZeverError::web(format!("Failed to bind {}: {}", addr, e)))
}

pub async fn serve(snapshot_rx: SnapshotReceiver, host: &str, port: u16) -> Result<()> {
    let listener = bind(host, port).await?;
    axum::serve(listener, build_router(AppState { snapshot_rx }))
        .await
        .map_err(|e| ZeverError::web(e.to_string()))
}
