//! The Manager's in-memory data model (spec.md §3).

use ahash::AHashMap as HashMap;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use crate::istio::IstioResources;

/// Opaque, non-empty identifier for a connected edge cluster.
///
/// Wrapped in `Arc<str>` rather than `String` because a `ClusterId` is
/// cloned into every derived index entry on every rebuild (spec.md §4.C);
/// an `Arc` clone is a refcount bump instead of a fresh heap allocation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(Arc<str>);

impl ClusterId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ClusterId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for ClusterId {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

/// A full snapshot of one cluster's inventory, as pushed by its edge.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterState {
    pub services: Vec<Service>,
    pub istio_resources: IstioResources,
    pub control_plane: ControlPlaneConfig,
}

/// Mesh-wide Istio control plane settings reported by the edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlPlaneConfig {
    pub pilot_scope_gateway_to_namespace: bool,
    pub root_namespace: String,
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self {
            pilot_scope_gateway_to_namespace: false,
            root_namespace: "istio-system".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub namespace: String,
    pub instances: Vec<ServiceInstance>,
}

impl Service {
    /// `"<namespace>:<name>"`, unique within one cluster's report but not
    /// globally — identical ids from different clusters are merged by the
    /// aggregated index.
    pub fn id(&self) -> String {
        format!("{}:{}", self.namespace, self.name)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ProxyType {
    #[default]
    None,
    Sidecar,
    Gateway,
    Router,
}

impl ProxyType {
    pub fn is_gateway(self) -> bool {
        matches!(self, ProxyType::Gateway)
    }
}

impl Default for ClusterId {
    fn default() -> Self {
        Self(Arc::from(""))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceInstance {
    pub cluster_id: ClusterId,
    pub ip: String,
    pub pod_name: String,
    pub namespace: String,
    pub cluster_name: String,
    pub envoy_present: bool,
    pub proxy_type: ProxyType,
    pub labels: HashMap<String, String>,
    pub annotations: HashMap<String, String>,
    pub containers: Vec<String>,
    pub pod_status: String,
    pub node_name: String,
    pub created_at: DateTime<Utc>,
}

impl ServiceInstance {
    /// `"<clusterId>:<namespace>:<podName>"`.
    pub fn instance_id(&self) -> String {
        format!("{}:{}:{}", self.cluster_id, self.namespace, self.pod_name)
    }
}

/// A `cluster:namespace:podName` instance id, parsed into its parts.
///
/// See spec.md §6 and §8 (testable property 7): parse-then-format must be
/// the identity for any well-formed id, and parsing must reject ids with
/// fewer or more than two `:` separators or any empty field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceIdParts {
    pub cluster_id: ClusterId,
    pub namespace: String,
    pub pod_name: String,
}

impl fmt::Display for InstanceIdParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.cluster_id, self.namespace, self.pod_name)
    }
}

impl std::str::FromStr for InstanceIdParts {
    type Err = crate::NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let [cluster_id, namespace, pod_name] = parts[..] else {
            return Err(crate::NavError::InvalidArgument(format!(
                "malformed instance id: {s}"
            )));
        };
        if cluster_id.is_empty() || namespace.is_empty() || pod_name.is_empty() {
            return Err(crate::NavError::InvalidArgument(format!(
                "malformed instance id: {s}"
            )));
        }
        Ok(Self {
            cluster_id: ClusterId::from(cluster_id),
            namespace: namespace.to_string(),
            pod_name: pod_name.to_string(),
        })
    }
}

/// A `Service` whose instances may span multiple clusters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregatedService {
    pub name: String,
    pub namespace: String,
    pub instances: Vec<AggregatedServiceInstance>,
}

impl AggregatedService {
    pub fn id(&self) -> String {
        format!("{}:{}", self.namespace, self.name)
    }
}

pub type AggregatedServiceInstance = ServiceInstance;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub cluster_id: ClusterId,
    pub connected_at: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    /// Clamped to `i32::MAX` before wire emission (spec.md §9 numeric
    /// conversions note); stored here as `usize` since that's what a
    /// `Vec::len()` actually yields.
    pub service_count: usize,
}

/// Derived from `ConnectionInfo::last_update` at query time (spec.md §4.D).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncStatus {
    Healthy,
    Stale,
    Disconnected,
}

impl SyncStatus {
    pub const STALE_AFTER: chrono::Duration = chrono::Duration::seconds(30);
    pub const DISCONNECTED_AFTER: chrono::Duration = chrono::Duration::minutes(5);

    /// `syncStatus(lastUpdate=t)` is monotonic in `now - t` (spec.md §8,
    /// testable property 4): HEALTHY -> STALE -> DISCONNECTED.
    pub fn derive(last_update: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let age = now - last_update;
        if age < Self::STALE_AFTER {
            SyncStatus::Healthy
        } else if age < Self::DISCONNECTED_AFTER {
            SyncStatus::Stale
        } else {
            SyncStatus::Disconnected
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SyncStatus::Healthy => "HEALTHY",
            SyncStatus::Stale => "STALE",
            SyncStatus::Disconnected => "DISCONNECTED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn instance_id_round_trip() {
        let parsed = InstanceIdParts::from_str("c1:default:pod-a").unwrap();
        assert_eq!(parsed.to_string(), "c1:default:pod-a");
    }

    #[test]
    fn instance_id_rejects_malformed() {
        assert!(InstanceIdParts::from_str("c1:default").is_err());
        assert!(InstanceIdParts::from_str("c1:default:pod:extra").is_err());
        assert!(InstanceIdParts::from_str(":default:pod").is_err());
        assert!(InstanceIdParts::from_str("c1::pod").is_err());
        assert!(InstanceIdParts::from_str("c1:default:").is_err());
    }

    #[test]
    fn sync_status_is_monotonic() {
        let now = Utc::now();
        assert_eq!(SyncStatus::derive(now, now), SyncStatus::Healthy);
        assert_eq!(
            SyncStatus::derive(now - chrono::Duration::seconds(45), now),
            SyncStatus::Stale
        );
        assert_eq!(
            SyncStatus::derive(now - chrono::Duration::minutes(10), now),
            SyncStatus::Disconnected
        );
    }
}
