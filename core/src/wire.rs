//! The `Connect` bidirectional stream's message shapes (spec.md §6).
//!
//! No `.proto`/`tonic_build` pipeline runs in this repo (spec.md treats the
//! wire schemas as a given external interface); these enums and structs are
//! the hand-declared stand-in `navigator-hub`'s Connection Manager speaks
//! directly, the same way `linkerd-policy-controller-grpc` treats
//! `linkerd2-proxy-api`'s generated types as given. `navigator-grpc` adapts
//! an actual `tonic::Streaming` onto these types at the transport edge.

use crate::model::ClusterState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterIdentification {
    pub cluster_id: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InboundFrame {
    Identification(ClusterIdentification),
    State(ClusterState),
    ProxyConfigResponse(ProxyConfigResponse),
}

#[derive(Clone, Debug, PartialEq)]
pub enum OutboundFrame {
    Ack(ConnectionAck),
    Error(ErrorMessage),
    ProxyConfigRequest(ProxyConfigRequest),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionAck {
    pub accepted: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidClusterIdentification,
    MessageProcessingError,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorMessage {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyConfigRequest {
    pub request_id: String,
    pub namespace: String,
    pub pod_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyConfigResponse {
    pub request_id: String,
    pub proxy_config: Vec<u8>,
    pub version: String,
    pub error_message: Option<String>,
}
