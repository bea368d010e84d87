//! gRPC surface of the greeting service

use std::sync::Arc;

use serde_json::json;
use tonic::{Request, Response, Status};

use traceguard_logging::ActiveLog;
use traceguard_middleware::grpc::render_status;

use crate::proto::greeter_server::Greeter;
use crate::proto::{SayRequest, SayResponse};
use crate::service::GreeterService;

/// Implements the generated `Greeter` service over [`GreeterService`].
pub struct GreeterGrpc {
    service: Arc<GreeterService>,
}

impl GreeterGrpc {
    /// Create the gRPC adapter.
    pub fn new(service: Arc<GreeterService>) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl Greeter for GreeterGrpc {
    async fn say(&self, request: Request<SayRequest>) -> Result<Response<SayResponse>, Status> {
        let log = request.extensions().get::<ActiveLog>().cloned();
        let id = request.get_ref().id.clone();
        if let Some(log) = &log {
            log.attach("handler", [("id", json!(id))]);
        }

        match self.service.say(&id).await {
            Ok(message) => Ok(Response::new(SayResponse { message })),
            Err(err) => Err(render_status(log.as_ref(), err.as_ref())),
        }
    }
}
