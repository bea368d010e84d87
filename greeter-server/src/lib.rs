//! Demo greeting service
//!
//! A deliberately small domain (look up a greeting by id, answer it in
//! three languages) wired through the full observability pipeline on both
//! transports. The interesting parts live in the `traceguard-*` crates;
//! this one shows how a service composes them:
//! - [`http_api`]: axum router with the middleware pipeline
//! - [`grpc_api`]: tonic service behind the tower layer stack
//! - [`metrics`]: pass-through Prometheus endpoint
//! - [`service`], [`repository`], [`validation`]: the business leaf

pub mod config;
pub mod grpc_api;
pub mod http_api;
pub mod metrics;
pub mod repository;
pub mod service;
pub mod validation;

/// Generated protobuf and gRPC bindings.
pub mod proto {
    #![allow(missing_docs)]
    tonic::include_proto!("greeter.v1");
}
