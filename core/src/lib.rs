#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Shared data model and error taxonomy for the Navigator Manager.
//!
//! This crate has no knowledge of gRPC, streaming, or the Connection
//! Manager's lifecycle; it only defines the records that flow between
//! them, the way `linkerd-policy-controller-core` underlies the policy
//! controller's grpc/index crates without depending on either.

pub mod error;
pub mod istio;
pub mod model;
pub mod wire;

pub use error::NavError;
pub use model::{
    AggregatedService, AggregatedServiceInstance, ClusterId, ClusterState, ConnectionInfo,
    ControlPlaneConfig, ProxyType, Service, ServiceInstance, SyncStatus,
};
