//! Typed summaries produced from Envoy's admin-plane JSON (spec.md §4.B).
//!
//! The inputs (`config_dump.json`, `clusters.json`) are themselves a
//! polymorphic mix of protobuf `Any` messages serialized through
//! `protojson`; we dig through them with `serde_json::Value` rather than
//! modeling every oneof, and only surface the fields this system actually
//! consumes.

use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ProxyMode {
    Sidecar,
    Gateway,
    Router,
    #[default]
    Unknown,
}

impl ProxyMode {
    pub fn from_node_id(node_id: &str) -> Self {
        match node_id.split('~').next().unwrap_or("") {
            "sidecar" => Self::Sidecar,
            "gateway" => Self::Gateway,
            "router" => Self::Router,
            _ => Self::Unknown,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Inbound,
    Outbound,
    Unspecified,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteType {
    Static,
    PortBased,
    ServiceSpecific,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressType {
    SocketAddress,
    PipeAddress,
    EnvoyInternalAddress,
    UnknownAddressType,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClusterType {
    Eds,
    StrictDns,
    Static,
}

/// The four `|`-separated fields of an Istio-generated cluster name, or
/// all-default if `name` didn't split into exactly four parts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterNameParts {
    pub direction: Option<Direction>,
    pub port: u32,
    pub subset: String,
    pub fqdn: String,
}

#[derive(Clone, Debug, Default)]
pub struct BootstrapSummary {
    pub node_id: String,
    pub node_cluster: String,
    pub metadata: HashMap<String, String>,
    pub region: Option<String>,
    pub zone: Option<String>,
    pub admin_address: Option<String>,
    pub admin_port: Option<u16>,
    pub ads_present: bool,
    pub lds_present: bool,
    pub cds_present: bool,
    pub cluster_manager_present: bool,
    pub proxy_mode: ProxyMode,
}

#[derive(Clone, Debug)]
pub struct ListenerEntry {
    pub name: String,
    pub is_static: bool,
}

#[derive(Clone, Debug)]
pub struct RouteEntry {
    pub name: String,
    pub is_static: bool,
    pub route_type: RouteType,
}

#[derive(Clone, Debug)]
pub struct EndpointSummary {
    pub address: String,
    pub port: u16,
    pub host_identifier: String,
    pub health_status: String,
    pub priority: u32,
    pub locality_weight: u32,
    pub weight: u32,
    pub region: Option<String>,
    pub zone: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ClusterEntry {
    pub name: String,
    pub is_static: bool,
    pub direction: Option<Direction>,
    pub port: u32,
    pub subset: String,
    pub fqdn: String,
    pub cluster_type: ClusterType,
    pub endpoints: Vec<EndpointSummary>,
}

impl ClusterEntry {
    pub fn from_name(name: impl Into<String>, is_static: bool) -> Self {
        let name = name.into();
        let parts = crate::cluster_name::parse_istio_cluster_name(&name);
        let cluster_type = crate::cluster_type::infer_cluster_type(&name);
        Self {
            name,
            is_static,
            direction: parts.direction,
            port: parts.port,
            subset: parts.subset,
            fqdn: parts.fqdn,
            cluster_type,
            endpoints: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigDumpSummary {
    pub bootstrap: Option<BootstrapSummary>,
    pub listeners: Vec<ListenerEntry>,
    pub clusters: Vec<ClusterEntry>,
    pub routes: Vec<RouteEntry>,
    /// Per-endpoint summaries flattened from `ClusterLoadAssignment`s, keyed
    /// by the cluster name the assignment was issued for.
    pub endpoints: HashMap<String, Vec<EndpointSummary>>,
}
