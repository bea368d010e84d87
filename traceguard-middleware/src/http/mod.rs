//! HTTP middleware pipeline
//!
//! Install on an `axum` router, outermost first:
//!
//! ```text
//! ServiceBuilder::new()
//!     .layer(middleware::from_fn(http::assign_correlation_id))
//!     .layer(middleware::from_fn_with_state(config, http::log_requests))
//!     .layer(middleware::from_fn(http::catch_panics))
//! ```
//!
//! Handlers report failures through [`render_error`], which classifies the
//! error, routes its text into the active log entry, and produces the
//! redacted wire payload.

mod correlation;
mod logger;
mod recover;
mod render;

pub use correlation::assign_correlation_id;
pub use logger::{log_requests, severity_for_status, HttpLoggerConfig, SENSITIVE_HEADERS};
pub use recover::catch_panics;
pub use render::render_error;
