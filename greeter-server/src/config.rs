//! Process configuration

use std::net::SocketAddr;
use std::time::Duration;

use traceguard_logging::LoggingConfig;
use traceguard_middleware::grpc::GrpcLoggerConfig;
use traceguard_middleware::http::HttpLoggerConfig;

/// Everything the binary needs to bring up its three servers.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Public HTTP API bind address (default: `0.0.0.0:8000`).
    pub http_addr: SocketAddr,
    /// gRPC bind address (default: `0.0.0.0:8001`).
    pub grpc_addr: SocketAddr,
    /// Metrics bind address (default: `0.0.0.0:9000`).
    pub metrics_addr: SocketAddr,
    /// Drain window for in-flight HTTP calls at shutdown (default: 10s).
    pub http_drain: Duration,
    /// Drain window for in-flight RPCs at shutdown (default: 10s).
    pub grpc_drain: Duration,
    /// Drain window for the metrics server at shutdown (default: 30s).
    pub metrics_drain: Duration,
    /// Subscriber bootstrap.
    pub logging: LoggingConfig,
    /// HTTP request-log options (default: concise).
    pub http_logger: HttpLoggerConfig,
    /// gRPC request-log options (default: concise).
    pub grpc_logger: GrpcLoggerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            grpc_addr: SocketAddr::from(([0, 0, 0, 0], 8001)),
            metrics_addr: SocketAddr::from(([0, 0, 0, 0], 9000)),
            http_drain: Duration::from_secs(10),
            grpc_drain: Duration::from_secs(10),
            metrics_drain: Duration::from_secs(30),
            logging: LoggingConfig {
                service: "greeter-server".to_string(),
                ..LoggingConfig::default()
            },
            http_logger: HttpLoggerConfig {
                concise: true,
                ..HttpLoggerConfig::default()
            },
            grpc_logger: GrpcLoggerConfig {
                concise: true,
                ..GrpcLoggerConfig::default()
            },
        }
    }
}
