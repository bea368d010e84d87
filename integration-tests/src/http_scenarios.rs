//! End-to-end scenarios over the HTTP transport

#[cfg(test)]
mod tests {
    use crate::support::recording_subscriber;

    use std::sync::Arc;

    use axum::body::Body;
    use axum::routing::get;
    use axum::{middleware, Router};
    use http::{Request, StatusCode};
    use tower::{ServiceBuilder, ServiceExt};

    use greeter_server::http_api;
    use greeter_server::repository::InMemoryRepository;
    use greeter_server::service::GreeterService;
    use traceguard_middleware::http::{
        assign_correlation_id, catch_panics, log_requests, HttpLoggerConfig,
    };

    fn api_router(config: HttpLoggerConfig) -> Router {
        let service = Arc::new(GreeterService::new(Arc::new(InMemoryRepository::seeded())));
        http_api::router(service, config)
    }

    async fn explode() -> axum::response::Response {
        panic!("boom")
    }

    fn panic_router(config: HttpLoggerConfig) -> Router {
        Router::new().route("/panic", get(explode)).layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(assign_correlation_id))
                .layer(middleware::from_fn_with_state(config, log_requests))
                .layer(middleware::from_fn(catch_panics)),
        )
    }

    async fn get_json(
        router: Router,
        uri: &str,
    ) -> (StatusCode, Option<serde_json::Value>) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            None
        } else {
            Some(serde_json::from_slice(&bytes).unwrap())
        };
        (status, body)
    }

    #[tokio::test]
    async fn known_id_answers_in_three_languages() {
        let (recorder, _guard) = recording_subscriber();

        let (status, body) = get_json(api_router(HttpLoggerConfig::default()), "/v1/say/hello").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body.unwrap(),
            serde_json::json!({ "message": "Hello, Bonjour, Salama" })
        );

        let records = recorder.request_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, tracing::Level::INFO);
        assert_eq!(records[0].fields["id"].len(), 36);
        let entry = records[0].entry();
        assert_eq!(entry["request"]["method"], "GET");
        assert_eq!(entry["response"]["status"]["code"], 200);
        assert_eq!(entry["handler"]["id"], "hello");
    }

    #[tokio::test]
    async fn unknown_id_renders_not_found() {
        let (recorder, _guard) = recording_subscriber();

        let (status, body) =
            get_json(api_router(HttpLoggerConfig::default()), "/v1/say/unknown-id").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.unwrap(), serde_json::json!({ "error": "message not found" }));

        let records = recorder.request_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, tracing::Level::WARN);
        assert_eq!(records[0].fields["error"], "message not found");
    }

    #[tokio::test]
    async fn missing_id_renders_the_validation_message() {
        let (recorder, _guard) = recording_subscriber();

        let (status, body) = get_json(api_router(HttpLoggerConfig::default()), "/v1/say").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.unwrap(), serde_json::json!({ "error": "Id field required" }));
        assert_eq!(recorder.request_records()[0].level, tracing::Level::WARN);
    }

    #[tokio::test]
    async fn panicking_handler_is_recovered() {
        let (recorder, _guard) = recording_subscriber();

        let response = panic_router(HttpLoggerConfig::default())
            .oneshot(Request::builder().uri("/panic").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty(), "the stack must never reach the wire");

        let records = recorder.request_records();
        assert_eq!(records.len(), 1, "one record per call, panic included");
        assert_eq!(records[0].level, tracing::Level::ERROR);
        assert_eq!(records[0].fields["error"], "panic caught: boom");
        let stack = records[0].entry()["panic"]["stack"].as_str().unwrap().to_string();
        assert!(!stack.is_empty());
    }

    #[tokio::test]
    async fn authorization_header_never_reaches_the_log() {
        let (recorder, _guard) = recording_subscriber();

        let request = Request::builder()
            .uri("/v1/say/hello")
            .header("authorization", "Bearer secret")
            .header("accept", "application/json")
            .body(Body::empty())
            .unwrap();
        api_router(HttpLoggerConfig::default())
            .oneshot(request)
            .await
            .unwrap();

        let entry = recorder.request_records()[0].entry();
        let headers = &entry["request"]["headers"];
        assert!(headers.get("authorization").is_none());
        assert_eq!(headers["accept"], "application/json");
    }

    #[tokio::test]
    async fn leak_mode_logs_everything_unmasked() {
        let (recorder, _guard) = recording_subscriber();

        let config = HttpLoggerConfig {
            leak: true,
            ..HttpLoggerConfig::default()
        };
        let request = Request::builder()
            .uri("/v1/say/hello")
            .header("authorization", "Bearer secret")
            .body(Body::empty())
            .unwrap();
        api_router(config).oneshot(request).await.unwrap();

        let entry = recorder.request_records()[0].entry();
        assert_eq!(entry["request"]["headers"]["authorization"], "Bearer secret");
    }

    #[tokio::test]
    async fn concise_mode_drops_the_header_groups() {
        let (recorder, _guard) = recording_subscriber();

        let config = HttpLoggerConfig {
            concise: true,
            ..HttpLoggerConfig::default()
        };
        let request = Request::builder()
            .uri("/v1/say/hello")
            .header("accept", "application/json")
            .body(Body::empty())
            .unwrap();
        api_router(config).oneshot(request).await.unwrap();

        let entry = recorder.request_records()[0].entry();
        assert!(entry["request"].get("headers").is_none());
        assert!(entry["request"].get("host").is_none());
        assert_eq!(entry["request"]["method"], "GET");
    }

    #[tokio::test]
    async fn each_call_gets_its_own_correlation_id() {
        let (recorder, _guard) = recording_subscriber();
        let router = api_router(HttpLoggerConfig::default());

        get_json(router.clone(), "/v1/say/hello").await;
        get_json(router, "/v1/say/hello").await;

        let records = recorder.request_records();
        assert_eq!(records.len(), 2);
        assert_ne!(records[0].fields["id"], records[1].fields["id"]);
    }
}
