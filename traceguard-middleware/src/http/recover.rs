//! Panic recovery for HTTP calls

use std::panic::AssertUnwindSafe;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use futures::FutureExt;
use serde_json::json;

use traceguard_logging::active_log;

use crate::fault;

/// Catch an unwinding handler and turn it into a safe `500`.
///
/// Must be the innermost middleware: a panic anywhere below is converted
/// here, before it could unwind past the logging wrapper and leave the
/// entry unfinished. The stack trace goes to the log entry only; the
/// response carries the status and nothing else.
pub async fn catch_panics(request: Request, next: Next) -> Response {
    let log = active_log(request.extensions());

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => {
            let message = format!("panic caught: {}", fault::panic_message(payload.as_ref()));
            if let Some(log) = log {
                log.record_error(&message);
                log.attach("panic", [("stack", json!(fault::captured_backtrace()))]);
            }
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
