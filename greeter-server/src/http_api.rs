//! HTTP surface of the greeting service

use std::sync::Arc;

use axum::extract::{Path, Request, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde::Serialize;
use serde_json::json;
use tower::ServiceBuilder;

use traceguard_logging::attach_log_attrs;
use traceguard_middleware::http::{
    assign_correlation_id, catch_panics, log_requests, render_error, HttpLoggerConfig,
};

use crate::service::GreeterService;

#[derive(Debug, Serialize)]
struct SayBody {
    message: String,
}

/// Build the public API router with the middleware pipeline attached.
///
/// The composition order is fixed: correlation first, then logging, then
/// recovery innermost.
pub fn router(service: Arc<GreeterService>, logger: HttpLoggerConfig) -> Router {
    Router::new()
        .route("/v1/say/:id", get(say))
        .route("/v1/say", get(say_unspecified))
        .with_state(service)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(assign_correlation_id))
                .layer(middleware::from_fn_with_state(logger, log_requests))
                .layer(middleware::from_fn(catch_panics)),
        )
}

async fn say(
    State(service): State<Arc<GreeterService>>,
    Path(id): Path<String>,
    request: Request,
) -> Response {
    respond(service, id, request).await
}

// Reached when the id segment is missing entirely; the empty id then
// surfaces the validation error.
async fn say_unspecified(
    State(service): State<Arc<GreeterService>>,
    request: Request,
) -> Response {
    respond(service, String::new(), request).await
}

async fn respond(service: Arc<GreeterService>, id: String, request: Request) -> Response {
    attach_log_attrs(request.extensions(), "handler", [("id", json!(id))]);

    match service.say(&id).await {
        Ok(message) => Json(SayBody { message }).into_response(),
        Err(err) => render_error(request.extensions(), err.as_ref()),
    }
}
