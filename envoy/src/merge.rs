//! Merge policy: combining the static config-dump cluster list with the
//! live `/clusters` endpoint data (spec.md §4.B).

use crate::types::{ClusterEntry, EndpointSummary};
use std::collections::HashMap;

/// Live data wins for endpoint membership: a cluster present in both
/// inputs keeps its config-dump identity (name, direction, port, subset,
/// fqdn, inferred type) but its endpoint list is replaced by the live
/// set. A cluster that `/clusters` reports but the config dump never
/// mentioned is added fresh, with its identity fields derived from its
/// name. A cluster the config dump has but `/clusters` doesn't report
/// on (never received traffic, so Envoy never warmed it) is kept as-is
/// with an empty endpoint list.
pub fn merge_clusters(
    static_clusters: Vec<ClusterEntry>,
    mut live: HashMap<String, Vec<EndpointSummary>>,
) -> Vec<ClusterEntry> {
    let mut merged = Vec::with_capacity(static_clusters.len().max(live.len()));
    for mut cluster in static_clusters {
        if let Some(endpoints) = live.remove(&cluster.name) {
            cluster.endpoints = endpoints;
        }
        merged.push(cluster);
    }
    for (name, endpoints) in live {
        let mut cluster = ClusterEntry::from_name(name, false);
        cluster.endpoints = endpoints;
        merged.push(cluster);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClusterType;

    fn endpoint(addr: &str) -> EndpointSummary {
        EndpointSummary {
            address: addr.to_string(),
            port: 80,
            host_identifier: format!("{addr}:80"),
            health_status: "HEALTHY".to_string(),
            priority: 0,
            locality_weight: 1,
            weight: 1,
            region: None,
            zone: None,
        }
    }

    #[test]
    fn live_endpoints_replace_static_ones_for_matching_cluster() {
        let mut static_cluster =
            ClusterEntry::from_name("outbound|9080||reviews.default.svc.cluster.local", false);
        static_cluster.endpoints = vec![endpoint("stale")];
        let mut live = HashMap::new();
        live.insert(
            "outbound|9080||reviews.default.svc.cluster.local".to_string(),
            vec![endpoint("10.0.0.9")],
        );
        let merged = merge_clusters(vec![static_cluster], live);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].endpoints[0].address, "10.0.0.9");
    }

    #[test]
    fn live_only_cluster_is_added_with_derived_identity() {
        let merged = merge_clusters(
            vec![],
            HashMap::from_iter([(
                "outbound|443||api.example.com".to_string(),
                vec![endpoint("93.184.216.34")],
            )]),
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].cluster_type, ClusterType::StrictDns);
        assert_eq!(merged[0].fqdn, "api.example.com");
    }

    #[test]
    fn static_only_cluster_keeps_empty_endpoints() {
        let static_cluster = ClusterEntry::from_name("prometheus_stats", true);
        let merged = merge_clusters(vec![static_cluster], HashMap::new());
        assert_eq!(merged.len(), 1);
        assert!(merged[0].endpoints.is_empty());
    }
}
