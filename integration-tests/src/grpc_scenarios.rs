//! End-to-end scenarios over the gRPC transport

#[cfg(test)]
mod tests {
    use crate::support::recording_subscriber;

    use std::convert::Infallible;
    use std::sync::Arc;

    use http_body_util::BodyExt;
    use tonic::body::BoxBody;
    use tonic::{Code, Status};
    use tower::{service_fn, ServiceBuilder, ServiceExt};

    use greeter_server::grpc_api::GreeterGrpc;
    use greeter_server::proto::greeter_server::Greeter;
    use greeter_server::proto::SayRequest;
    use greeter_server::repository::InMemoryRepository;
    use greeter_server::service::GreeterService;
    use traceguard_logging::{ActiveLog, CorrelationId};
    use traceguard_middleware::grpc::{
        CorrelationLayer, GrpcLoggerConfig, LoggerLayer, RecoverLayer,
    };

    fn greeter() -> GreeterGrpc {
        GreeterGrpc::new(Arc::new(GreeterService::new(Arc::new(
            InMemoryRepository::seeded(),
        ))))
    }

    fn empty_grpc_body() -> BoxBody {
        http_body_util::Empty::<bytes::Bytes>::new()
            .map_err(|never| match never {})
            .boxed_unsync()
    }

    fn grpc_request() -> http::Request<()> {
        http::Request::builder()
            .uri("/greeter.v1.Greeter/Say")
            .header("content-type", "application/grpc")
            .header("authorization", "Bearer secret")
            .header("x-caller", "integration-test")
            .body(())
            .unwrap()
    }

    #[tokio::test]
    async fn known_id_answers_in_three_languages() {
        let response = greeter()
            .say(tonic::Request::new(SayRequest {
                id: "hello".to_string(),
            }))
            .await
            .unwrap();

        assert_eq!(response.get_ref().message, "Hello, Bonjour, Salama");
    }

    #[tokio::test]
    async fn unknown_id_maps_to_not_found() {
        let status = greeter()
            .say(tonic::Request::new(SayRequest {
                id: "unknown-id".to_string(),
            }))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::NotFound);
        assert_eq!(status.message(), "message not found");
    }

    #[tokio::test]
    async fn empty_id_maps_to_invalid_argument() {
        let status = greeter()
            .say(tonic::Request::new(SayRequest { id: String::new() }))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(status.message(), "Id field required");
    }

    #[tokio::test]
    async fn pipeline_publishes_call_state_to_the_handler() {
        let (recorder, _guard) = recording_subscriber();

        let stack = ServiceBuilder::new()
            .layer(CorrelationLayer::new())
            .layer(LoggerLayer::new(GrpcLoggerConfig::default()))
            .layer(RecoverLayer::new())
            .service(service_fn(|request: http::Request<()>| async move {
                assert!(request.extensions().get::<CorrelationId>().is_some());
                let log = request.extensions().get::<ActiveLog>().unwrap();
                log.attach("handler", [("reached", serde_json::json!(true))]);
                Ok::<_, Infallible>(http::Response::new(empty_grpc_body()))
            }));

        let response = stack.oneshot(grpc_request()).await.unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);

        let records = recorder.request_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, tracing::Level::INFO);
        assert_eq!(records[0].fields["id"].len(), 36);
        let entry = records[0].entry();
        assert_eq!(entry["rpc"]["method"], "/greeter.v1.Greeter/Say");
        assert_eq!(entry["rpc"]["status"]["code"], 0);
        assert_eq!(entry["handler"]["reached"], true);
    }

    #[tokio::test]
    async fn authorization_metadata_never_reaches_the_log() {
        let (recorder, _guard) = recording_subscriber();

        let stack = ServiceBuilder::new()
            .layer(CorrelationLayer::new())
            .layer(LoggerLayer::new(GrpcLoggerConfig::default()))
            .layer(RecoverLayer::new())
            .service(service_fn(|_request: http::Request<()>| async move {
                Ok::<_, Infallible>(http::Response::new(empty_grpc_body()))
            }));

        stack.oneshot(grpc_request()).await.unwrap();

        let entry = recorder.request_records()[0].entry();
        assert!(entry["incoming"].get("authorization").is_none());
        assert_eq!(entry["incoming"]["x-caller"], "integration-test");
    }

    #[tokio::test]
    async fn panicking_handler_becomes_a_trailers_only_internal() {
        let (recorder, _guard) = recording_subscriber();

        let stack = ServiceBuilder::new()
            .layer(CorrelationLayer::new())
            .layer(LoggerLayer::new(GrpcLoggerConfig::default()))
            .layer(RecoverLayer::new())
            .service(service_fn(|_request: http::Request<()>| async move {
                if true {
                    panic!("boom");
                }
                Ok::<_, Infallible>(http::Response::new(empty_grpc_body()))
            }));

        let response = stack.oneshot(grpc_request()).await.unwrap();

        let status = Status::from_header_map(response.headers()).unwrap();
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), "panic caught: boom");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty(), "the stack must never reach the wire");

        let records = recorder.request_records();
        assert_eq!(records.len(), 1, "one record per call, panic included");
        assert_eq!(records[0].level, tracing::Level::ERROR);
        assert_eq!(records[0].fields["error"], "panic caught: boom");
        let entry = records[0].entry();
        assert!(!entry["panic"]["stack"].as_str().unwrap().is_empty());
        assert_eq!(entry["rpc"]["status"]["code"], 13);
    }
}
