//! Frontend query-service request/response shapes (spec.md §4.F, §6).
//!
//! As with `navigator_core::wire`, no `tonic_build` pipeline runs here;
//! these are the hand-declared stand-ins for what it would generate,
//! following the same convention `linkerd-policy-controller-grpc` applies
//! to `linkerd2-proxy-api`'s types.

use chrono::{DateTime, Utc};
use navigator_envoy::types::ConfigDumpSummary;

#[derive(Clone, Debug, Default)]
pub struct ListServicesRequest {
    pub namespace: Option<String>,
    pub cluster_id: Option<String>,
}

#[derive(Clone, Debug)]
pub struct GetProxyConfigResponse {
    pub raw: Vec<u8>,
    pub version: String,
    pub parsed: ConfigDumpSummary,
}

#[derive(Clone, Debug)]
pub struct ClusterSummary {
    pub cluster_id: String,
    pub connected_at: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    /// Clamped to `i32::MAX` before emission (spec.md §9 numeric
    /// conversions note).
    pub service_count: i32,
    pub sync_status: &'static str,
}
