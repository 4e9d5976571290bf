//! The crate-wide error taxonomy. Every fallible operation in the
//! Manager's core, policy, envoy and hub crates resolves to one of these
//! variants; `navigator-grpc` is the only place that translates them to
//! `tonic::Status`.

#[derive(Clone, Debug, thiserror::Error, Eq, PartialEq)]
pub enum NavError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("disconnected: {0}")]
    Disconnected(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl NavError {
    pub fn cluster_unknown(cluster_id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("unknown cluster: {cluster_id}"))
    }
}
