//! Transport middleware for request observability
//!
//! Both servers in the process compose the same three-part pipeline around
//! their handlers, in a fixed order:
//!
//! 1. correlation: tag the call with a fresh [`traceguard_logging::CorrelationId`]
//! 2. logging: open the call's [`traceguard_logging::LogEntry`], time the
//!    call, fold the outcome into one structured record
//! 3. recovery: innermost; turn an unwinding handler into a classified
//!    internal error instead of a crashed connection
//!
//! The [`http`] module implements the pipeline as `axum` middleware
//! functions, the [`grpc`] module as `tower` layers suitable for
//! `tonic::transport::Server::layer`. Error rendering for each wire format
//! lives next to its transport.

pub mod fault;
pub mod grpc;
pub mod http;

mod headers;

pub use fault::install_panic_capture;
