//! gRPC middleware pipeline
//!
//! Install on a tonic server, outermost first:
//!
//! ```text
//! Server::builder()
//!     .layer(
//!         ServiceBuilder::new()
//!             .layer(grpc::CorrelationLayer::new())
//!             .layer(grpc::LoggerLayer::new(config))
//!             .layer(grpc::RecoverLayer::new()),
//!     )
//!     .add_service(...)
//! ```
//!
//! The layers operate on the `http` request/response pair tonic routes
//! through, so the call state they publish into the extensions is visible
//! to service implementations via `tonic::Request::extensions`. Service
//! code reports failures through [`render_status`].

mod correlation;
mod logger;
mod recover;
mod render;

pub use correlation::{CorrelationLayer, CorrelationService};
pub use logger::{
    severity_for_code, GrpcLoggerConfig, LoggerLayer, LoggerService, SENSITIVE_METADATA,
};
pub use recover::{RecoverLayer, RecoverService};
pub use render::render_status;
