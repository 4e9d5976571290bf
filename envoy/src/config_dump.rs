//! `config_dump.json` parser (spec.md §4.B): dispatches each entry of the
//! top-level `configs[]` array on its `@type` tag.

use crate::types::{
    BootstrapSummary, ClusterEntry, ConfigDumpSummary, EndpointSummary, ListenerEntry, ProxyMode,
    RouteEntry,
};
use navigator_core::NavError;
use serde_json::Value;

pub fn parse_config_dump(raw: &str) -> Result<ConfigDumpSummary, NavError> {
    let root: Value = serde_json::from_str(raw)
        .map_err(|e| NavError::InvalidArgument(format!("malformed config_dump json: {e}")))?;

    let configs = root
        .get("configs")
        .and_then(Value::as_array)
        .ok_or_else(|| NavError::InvalidArgument("config_dump json missing configs[]".to_string()))?;

    let mut summary = ConfigDumpSummary::default();
    for entry in configs {
        let Some(type_tag) = entry.get("@type").and_then(Value::as_str) else {
            continue;
        };
        match type_tag.rsplit('.').next().unwrap_or("") {
            "BootstrapConfigDump" => summary.bootstrap = Some(parse_bootstrap(entry)),
            "ListenersConfigDump" => summary.listeners.extend(parse_listeners(entry)),
            "ClustersConfigDump" => summary.clusters.extend(parse_clusters(entry)),
            "RoutesConfigDump" => summary.routes.extend(parse_routes(entry)),
            "EndpointsConfigDump" => merge_endpoints(&mut summary.endpoints, parse_endpoints(entry)),
            _ => tracing::debug!(%type_tag, "ignoring unrecognized config_dump entry type"),
        }
    }
    Ok(summary)
}

fn parse_bootstrap(entry: &Value) -> BootstrapSummary {
    let bootstrap = entry.get("bootstrap").cloned().unwrap_or(Value::Null);
    let node = bootstrap.get("node").cloned().unwrap_or(Value::Null);

    let node_id = node
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let node_cluster = node
        .get("cluster")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let mut metadata = std::collections::HashMap::new();
    if let Some(obj) = node.get("metadata").and_then(Value::as_object) {
        for (k, v) in obj {
            if let Some(s) = v.as_str() {
                metadata.insert(k.clone(), s.to_string());
            }
        }
    }

    let region = node
        .get("locality")
        .and_then(|l| l.get("region"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let zone = node
        .get("locality")
        .and_then(|l| l.get("zone"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let admin = bootstrap.get("admin").cloned().unwrap_or(Value::Null);
    let admin_socket = admin
        .get("address")
        .and_then(|a| a.get("socket_address"));
    let admin_address = admin_socket
        .and_then(|s| s.get("address"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let admin_port = admin_socket
        .and_then(|s| s.get("port_value"))
        .and_then(Value::as_u64)
        .map(|p| p as u16);

    let dynamic_resources = bootstrap
        .get("dynamic_resources")
        .cloned()
        .unwrap_or(Value::Null);
    let ads_present = dynamic_resources.get("ads_config").is_some();
    let lds_present = dynamic_resources.get("lds_config").is_some();
    let cds_present = dynamic_resources.get("cds_config").is_some();
    let cluster_manager_present = bootstrap.get("cluster_manager").is_some();

    BootstrapSummary {
        proxy_mode: ProxyMode::from_node_id(&node_id),
        node_id,
        node_cluster,
        metadata,
        region,
        zone,
        admin_address,
        admin_port,
        ads_present,
        lds_present,
        cds_present,
        cluster_manager_present,
    }
}

fn parse_listeners(entry: &Value) -> Vec<ListenerEntry> {
    let mut out = Vec::new();
    for item in entry
        .get("static_listeners")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        if let Some(name) = item
            .get("listener")
            .and_then(|l| l.get("name"))
            .and_then(Value::as_str)
        {
            out.push(ListenerEntry {
                name: name.to_string(),
                is_static: true,
            });
        }
    }
    for item in entry
        .get("dynamic_listeners")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        let name = item
            .get("active_state")
            .and_then(|s| s.get("listener"))
            .and_then(|l| l.get("name"))
            .and_then(Value::as_str)
            .or_else(|| item.get("name").and_then(Value::as_str));
        if let Some(name) = name {
            out.push(ListenerEntry {
                name: name.to_string(),
                is_static: false,
            });
        }
    }
    out
}

fn parse_clusters(entry: &Value) -> Vec<ClusterEntry> {
    let mut out = Vec::new();
    for item in entry
        .get("static_clusters")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        if let Some(name) = item
            .get("cluster")
            .and_then(|c| c.get("name"))
            .and_then(Value::as_str)
        {
            out.push(ClusterEntry::from_name(name, true));
        }
    }
    for item in entry
        .get("dynamic_active_clusters")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        if let Some(name) = item
            .get("cluster")
            .and_then(|c| c.get("name"))
            .and_then(Value::as_str)
        {
            out.push(ClusterEntry::from_name(name, false));
        }
    }
    out
}

fn parse_routes(entry: &Value) -> Vec<RouteEntry> {
    let mut out = Vec::new();
    for item in entry
        .get("static_route_configs")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        if let Some(name) = item
            .get("route_config")
            .and_then(|r| r.get("name"))
            .and_then(Value::as_str)
        {
            out.push(RouteEntry {
                name: name.to_string(),
                is_static: true,
                route_type: crate::route_classify::classify_route_name(name, true),
            });
        }
    }
    for item in entry
        .get("dynamic_route_configs")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        if let Some(name) = item
            .get("route_config")
            .and_then(|r| r.get("name"))
            .and_then(Value::as_str)
        {
            out.push(RouteEntry {
                name: name.to_string(),
                is_static: false,
                route_type: crate::route_classify::classify_route_name(name, false),
            });
        }
    }
    out
}

fn parse_endpoints(entry: &Value) -> std::collections::HashMap<String, Vec<EndpointSummary>> {
    let mut out: std::collections::HashMap<String, Vec<EndpointSummary>> =
        std::collections::HashMap::new();
    let keys = ["static_endpoint_configs", "dynamic_endpoint_configs"];
    for key in keys {
        for item in entry.get(key).and_then(Value::as_array).into_iter().flatten() {
            let Some(cla) = item.get("endpoint_config") else {
                continue;
            };
            let Some(cluster_name) = cla.get("cluster_name").and_then(Value::as_str) else {
                continue;
            };
            let endpoints = flatten_cluster_load_assignment(cla);
            out.entry(cluster_name.to_string())
                .or_default()
                .extend(endpoints);
        }
    }
    out
}

fn flatten_cluster_load_assignment(cla: &Value) -> Vec<EndpointSummary> {
    let mut out = Vec::new();
    for locality_group in cla
        .get("endpoints")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        let priority = locality_group
            .get("priority")
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32;
        let locality_weight = locality_group
            .get("load_balancing_weight")
            .and_then(|w| w.get("value"))
            .and_then(Value::as_u64)
            .unwrap_or(1) as u32;
        let region = locality_group
            .get("locality")
            .and_then(|l| l.get("region"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let zone = locality_group
            .get("locality")
            .and_then(|l| l.get("zone"))
            .and_then(Value::as_str)
            .map(str::to_string);

        for lb_endpoint in locality_group
            .get("lb_endpoints")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            let Some(endpoint) = lb_endpoint.get("endpoint") else {
                continue;
            };
            let socket = endpoint
                .get("address")
                .and_then(|a| a.get("socket_address"));
            let Some(address) = socket.and_then(|s| s.get("address")).and_then(Value::as_str)
            else {
                continue;
            };
            let port = socket
                .and_then(|s| s.get("port_value"))
                .and_then(Value::as_u64)
                .unwrap_or(0) as u16;
            let host_identifier = endpoint
                .get("hostname")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("{address}:{port}"));
            let health_status = lb_endpoint
                .get("health_status")
                .and_then(Value::as_str)
                .unwrap_or("UNKNOWN")
                .to_string();
            let weight = lb_endpoint
                .get("load_balancing_weight")
                .and_then(|w| w.get("value"))
                .and_then(Value::as_u64)
                .unwrap_or(1) as u32;

            out.push(EndpointSummary {
                address: address.to_string(),
                port,
                host_identifier,
                health_status,
                priority,
                locality_weight,
                weight,
                region: region.clone(),
                zone: zone.clone(),
            });
        }
    }
    out
}

fn merge_endpoints(
    base: &mut std::collections::HashMap<String, Vec<EndpointSummary>>,
    additional: std::collections::HashMap<String, Vec<EndpointSummary>>,
) {
    for (cluster, endpoints) in additional {
        base.entry(cluster).or_default().extend(endpoints);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bootstrap_with_locality_and_admin() {
        let raw = serde_json::json!({
            "configs": [{
                "@type": "type.googleapis.com/envoy.admin.v3.BootstrapConfigDump",
                "bootstrap": {
                    "node": {
                        "id": "sidecar~10.0.0.5~reviews-v1-abc.default~default.svc.cluster.local",
                        "cluster": "reviews.default",
                        "locality": {"region": "us-east", "zone": "us-east-1a"},
                        "metadata": {"ISTIO_VERSION": "1.20.0"}
                    },
                    "admin": {"address": {"socket_address": {"address": "127.0.0.1", "port_value": 15000}}},
                    "dynamic_resources": {"ads_config": {}, "lds_config": {}, "cds_config": {}},
                    "cluster_manager": {}
                }
            }]
        })
        .to_string();
        let summary = parse_config_dump(&raw).unwrap();
        let bootstrap = summary.bootstrap.unwrap();
        assert_eq!(bootstrap.proxy_mode, ProxyMode::Sidecar);
        assert_eq!(bootstrap.region.as_deref(), Some("us-east"));
        assert_eq!(bootstrap.admin_port, Some(15000));
        assert!(bootstrap.ads_present && bootstrap.cluster_manager_present);
    }

    #[test]
    fn dispatches_unknown_type_tags_without_erroring() {
        let raw = serde_json::json!({
            "configs": [{"@type": "type.googleapis.com/envoy.admin.v3.SecretsConfigDump"}]
        })
        .to_string();
        let summary = parse_config_dump(&raw).unwrap();
        assert!(summary.bootstrap.is_none());
    }

    #[test]
    fn flattens_endpoints_from_cluster_load_assignment() {
        let raw = serde_json::json!({
            "configs": [{
                "@type": "type.googleapis.com/envoy.admin.v3.EndpointsConfigDump",
                "dynamic_endpoint_configs": [{
                    "endpoint_config": {
                        "cluster_name": "outbound|9080||reviews.default.svc.cluster.local",
                        "endpoints": [{
                            "priority": 0,
                            "locality": {"region": "us-east"},
                            "lb_endpoints": [{
                                "endpoint": {"address": {"socket_address": {"address": "10.0.0.9", "port_value": 9080}}},
                                "health_status": "HEALTHY"
                            }]
                        }]
                    }
                }]
            }]
        })
        .to_string();
        let summary = parse_config_dump(&raw).unwrap();
        let endpoints = &summary.endpoints["outbound|9080||reviews.default.svc.cluster.local"];
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].host_identifier, "10.0.0.9:9080");
    }

    #[test]
    fn missing_configs_array_is_an_error() {
        assert!(parse_config_dump("{}").is_err());
    }
}
