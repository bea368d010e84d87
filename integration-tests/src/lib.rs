//! Integration tests for the traceguard pipeline
//!
//! These tests drive the demo service through the full middleware
//! composition on both transports (no sockets; the routers and layer
//! stacks are exercised as tower services) and observe the emitted log
//! records through a recording subscriber.

pub mod grpc_scenarios;
pub mod http_scenarios;
pub mod support;
