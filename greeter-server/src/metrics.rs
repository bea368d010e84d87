//! Pass-through metrics endpoint

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use prometheus::{Encoder, TextEncoder};

/// Router exposing `GET /metrics` in the Prometheus text format.
///
/// Exposition only; nothing in the pipeline records metrics itself.
pub fn router() -> Router {
    Router::new().route("/metrics", get(serve_metrics))
}

async fn serve_metrics() -> Response {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
    }
    (
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}
