use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use http::StatusCode;

/// Health check handler
///
/// Reports unhealthy when the staging directory has gone away, since every
/// upload would fail with a 500 until it is recreated.
pub async fn health_handler(State(stt): State<Arc<stt::Server>>) -> impl IntoResponse {
    match tokio::fs::metadata(stt.store().dir()).await {
        Ok(meta) if meta.is_dir() => (StatusCode::OK, "ok"),
        _ => {
            tracing::warn!(dir = %stt.store().dir().display(), "staging directory unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, "staging directory unavailable")
        }
    }
}
