//! Binary entry point
//!
//! Brings up three servers on their own listeners (the HTTP API, the gRPC
//! API and the metrics endpoint) and drains all of them concurrently on
//! SIGINT/SIGTERM. Every in-flight call finishes its middleware chain
//! before its server stops, so no log entry is abandoned mid-flight; a
//! per-server drain deadline bounds how long that may take.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tonic::transport::Server;
use tower::ServiceBuilder;
use tracing::{error, info, warn};

use greeter_server::config::ServerConfig;
use greeter_server::grpc_api::GreeterGrpc;
use greeter_server::proto::greeter_server::GreeterServer;
use greeter_server::repository::InMemoryRepository;
use greeter_server::service::GreeterService;
use greeter_server::{http_api, metrics};
use traceguard_middleware::grpc::{CorrelationLayer, LoggerLayer, RecoverLayer};
use traceguard_middleware::install_panic_capture;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::default();
    traceguard_logging::init(&config.logging)?;
    install_panic_capture();

    let repository = Arc::new(InMemoryRepository::seeded());
    let service = Arc::new(GreeterService::new(repository));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_signal().await;
        warn!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let http_task = tokio::spawn(serve_http(
        config.clone(),
        service.clone(),
        shutdown_rx.clone(),
    ));
    let grpc_task = tokio::spawn(serve_grpc(
        config.clone(),
        service.clone(),
        shutdown_rx.clone(),
    ));
    let metrics_task = tokio::spawn(serve_metrics(config.clone(), shutdown_rx));

    info!("started");
    let (http, grpc, metrics) = tokio::try_join!(http_task, grpc_task, metrics_task)?;
    http?;
    grpc?;
    metrics?;
    info!("shutdown complete");
    Ok(())
}

async fn serve_http(
    config: ServerConfig,
    service: Arc<GreeterService>,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let router = http_api::router(service, config.http_logger.clone());
    let listener = TcpListener::bind(config.http_addr).await?;
    info!(address = %config.http_addr, "http server listening");

    let deadline = drain_deadline(shutdown.clone(), config.http_drain);
    let serve = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = shutdown.changed().await;
        info!("gracefully shutting down http");
    });

    tokio::select! {
        result = serve => {
            result?;
            info!("http shut down");
        }
        () = deadline => warn!("http drain deadline exceeded"),
    }
    Ok(())
}

async fn serve_grpc(
    config: ServerConfig,
    service: Arc<GreeterService>,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let pipeline = ServiceBuilder::new()
        .layer(CorrelationLayer::new())
        .layer(LoggerLayer::new(config.grpc_logger.clone()))
        .layer(RecoverLayer::new());

    let deadline = drain_deadline(shutdown.clone(), config.grpc_drain);
    info!(address = %config.grpc_addr, "grpc server listening");
    let serve = Server::builder()
        .layer(pipeline)
        .add_service(GreeterServer::new(GreeterGrpc::new(service)))
        .serve_with_shutdown(config.grpc_addr, async move {
            let _ = shutdown.changed().await;
            info!("gracefully shutting down grpc");
        });

    tokio::select! {
        result = serve => {
            result?;
            info!("grpc shut down");
        }
        () = deadline => warn!("grpc drain deadline exceeded"),
    }
    Ok(())
}

async fn serve_metrics(
    config: ServerConfig,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.metrics_addr).await?;
    info!(address = %config.metrics_addr, "metrics server listening");

    let deadline = drain_deadline(shutdown.clone(), config.metrics_drain);
    let serve = axum::serve(listener, metrics::router()).with_graceful_shutdown(async move {
        let _ = shutdown.changed().await;
        info!("gracefully shutting down metrics");
    });

    tokio::select! {
        result = serve => {
            result?;
            info!("metrics shut down");
        }
        () = deadline => warn!("metrics drain deadline exceeded"),
    }
    Ok(())
}

// Resolves once the signal has fired and the drain window has elapsed;
// selecting against it aborts whatever is still in flight.
async fn drain_deadline(mut shutdown: watch::Receiver<bool>, drain: Duration) {
    while !*shutdown.borrow() {
        if shutdown.changed().await.is_err() {
            break;
        }
    }
    tokio::time::sleep(drain).await;
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to install SIGINT handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
