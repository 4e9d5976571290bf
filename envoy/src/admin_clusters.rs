//! `/clusters?format=json` admin parser (spec.md §4.B).

use crate::types::{AddressType, EndpointSummary};
use navigator_core::NavError;
use serde_json::Value;
use std::collections::HashMap;

/// Parses Envoy's `/clusters?format=json` admin output into live
/// endpoint summaries, keyed by cluster name.
pub fn parse_admin_clusters(raw: &str) -> Result<HashMap<String, Vec<EndpointSummary>>, NavError> {
    let root: Value = serde_json::from_str(raw)
        .map_err(|e| NavError::InvalidArgument(format!("malformed /clusters json: {e}")))?;

    let statuses = root
        .get("cluster_statuses")
        .and_then(Value::as_array)
        .ok_or_else(|| NavError::InvalidArgument("/clusters json missing cluster_statuses".to_string()))?;

    let mut out: HashMap<String, Vec<EndpointSummary>> = HashMap::new();
    for status in statuses {
        let Some(name) = status.get("name").and_then(Value::as_str) else {
            continue;
        };
        let hosts = status
            .get("host_statuses")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let mut endpoints = Vec::with_capacity(hosts.len());
        for host in &hosts {
            if let Some(summary) = parse_host_status(host) {
                endpoints.push(summary);
            }
        }
        out.entry(name.to_string()).or_default().extend(endpoints);
    }
    Ok(out)
}

fn parse_host_status(host: &Value) -> Option<EndpointSummary> {
    let (address_type, address, port, host_identifier) = classify_address(host.get("address")?)?;

    let health_status = host
        .get("health_status")
        .and_then(|h| h.get("eds_health_status"))
        .and_then(Value::as_str)
        .unwrap_or("UNKNOWN")
        .to_string();

    let weight = host
        .get("weight")
        .and_then(Value::as_u64)
        .unwrap_or(1) as u32;

    let locality_weight = host
        .get("locality_weight")
        .or_else(|| host.get("locality").and_then(|l| l.get("weight")))
        .and_then(Value::as_u64)
        .unwrap_or(weight as u64) as u32;

    let region = host
        .get("locality")
        .and_then(|l| l.get("region"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let zone = host
        .get("locality")
        .and_then(|l| l.get("zone"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let _ = address_type;
    Some(EndpointSummary {
        address,
        port,
        host_identifier,
        health_status,
        priority: host.get("priority").and_then(Value::as_u64).unwrap_or(0) as u32,
        locality_weight,
        weight,
        region,
        zone,
    })
}

/// Returns `(AddressType, address, port, host_identifier)`, or `None` if
/// `address` matches none of the three known union variants — such hosts
/// are dropped (spec.md §4.B).
fn classify_address(address: &Value) -> Option<(AddressType, String, u16, String)> {
    if let Some(socket) = address.get("socket_address") {
        let addr = socket.get("address").and_then(Value::as_str)?.to_string();
        let port = socket
            .get("port_value")
            .and_then(Value::as_u64)
            .unwrap_or(0) as u16;
        if addr.starts_with("./") || addr.starts_with('/') || addr.contains("/socket") {
            let identifier = addr.clone();
            return Some((AddressType::PipeAddress, addr, 0, identifier));
        }
        let identifier = format!("{addr}:{port}");
        return Some((AddressType::SocketAddress, addr, port, identifier));
    }
    if let Some(pipe) = address.get("pipe") {
        let path = pipe.get("path").and_then(Value::as_str)?.to_string();
        let identifier = format!("unix://{path}");
        return Some((AddressType::PipeAddress, identifier.clone(), 0, identifier));
    }
    if let Some(internal) = address.get("envoy_internal_address") {
        let listener = internal
            .get("server_listener_name")
            .and_then(Value::as_str)
            .unwrap_or("");
        let endpoint_id = internal
            .get("endpoint_id")
            .and_then(Value::as_str)
            .unwrap_or("");
        let identifier = format!("envoy://{listener}/{endpoint_id}");
        return Some((
            AddressType::EnvoyInternalAddress,
            identifier.clone(),
            0,
            identifier,
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_socket_address_host() {
        let raw = serde_json::json!({
            "cluster_statuses": [{
                "name": "outbound|9080||reviews.default.svc.cluster.local",
                "host_statuses": [{
                    "address": {"socket_address": {"address": "10.0.0.5", "port_value": 9080}},
                    "health_status": {"eds_health_status": "HEALTHY"},
                    "weight": 2,
                    "locality": {"region": "us-east", "zone": "us-east-1a"}
                }]
            }]
        })
        .to_string();
        let parsed = parse_admin_clusters(&raw).unwrap();
        let endpoints = &parsed["outbound|9080||reviews.default.svc.cluster.local"];
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].host_identifier, "10.0.0.5:9080");
        assert_eq!(endpoints[0].health_status, "HEALTHY");
        assert_eq!(endpoints[0].region.as_deref(), Some("us-east"));
    }

    #[test]
    fn parses_pipe_address_host() {
        let raw = serde_json::json!({
            "cluster_statuses": [{
                "name": "local",
                "host_statuses": [{"address": {"pipe": {"path": "/var/run/envoy.sock"}}}]
            }]
        })
        .to_string();
        let parsed = parse_admin_clusters(&raw).unwrap();
        assert_eq!(
            parsed["local"][0].host_identifier,
            "unix:///var/run/envoy.sock"
        );
    }

    #[test]
    fn unknown_address_shape_is_dropped() {
        let raw = serde_json::json!({
            "cluster_statuses": [{
                "name": "weird",
                "host_statuses": [{"address": {"future_variant": {}}}]
            }]
        })
        .to_string();
        let parsed = parse_admin_clusters(&raw).unwrap();
        assert_eq!(parsed["weird"].len(), 0);
    }

    #[test]
    fn missing_cluster_statuses_is_an_error() {
        let err = parse_admin_clusters("{}").unwrap_err();
        assert!(matches!(err, NavError::InvalidArgument(_)));
    }
}
