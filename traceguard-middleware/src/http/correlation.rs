//! Correlation-ID assignment for HTTP calls

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use traceguard_logging::CorrelationId;

/// Tag the request with a fresh [`CorrelationId`].
///
/// Must be the outermost middleware so every later stage, the logging
/// wrapper included, can read the identifier from the request extensions.
/// Nothing else is touched here; the log entry does not exist yet.
pub async fn assign_correlation_id(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(CorrelationId::generate());
    next.run(request).await
}
