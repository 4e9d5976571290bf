//! Cluster-type inference from name (spec.md §4.B).

use crate::cluster_name::parse_istio_cluster_name;
use crate::types::{ClusterType, Direction};

const KNOWN_INTERNAL: &[&str] = &[
    "prometheus_stats",
    "agent",
    "sds-grpc",
    "xds-grpc",
    "zipkin",
    "jaeger",
    "envoy_accesslog_service",
];

pub fn infer_cluster_type(name: &str) -> ClusterType {
    if KNOWN_INTERNAL.contains(&name) {
        return ClusterType::Static;
    }

    let parts = parse_istio_cluster_name(name);
    match parts.direction {
        Some(Direction::Outbound) => {
            if parts.fqdn.ends_with(".svc.cluster.local") {
                ClusterType::Eds
            } else if parts.fqdn.contains('.') {
                ClusterType::StrictDns
            } else {
                ClusterType::Eds
            }
        }
        Some(Direction::Inbound) => ClusterType::Eds,
        _ => ClusterType::Eds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_service_is_eds() {
        let t = infer_cluster_type("outbound|9080|v1|reviews.default.svc.cluster.local");
        assert_eq!(t, ClusterType::Eds);
    }

    #[test]
    fn external_dotted_domain_is_strict_dns() {
        let t = infer_cluster_type("outbound|443||api.example.com");
        assert_eq!(t, ClusterType::StrictDns);
    }

    #[test]
    fn inbound_is_always_eds() {
        let t = infer_cluster_type("inbound|9080||reviews.default.svc.cluster.local");
        assert_eq!(t, ClusterType::Eds);
    }

    #[test]
    fn known_internal_name_is_static() {
        assert_eq!(infer_cluster_type("prometheus_stats"), ClusterType::Static);
        assert_eq!(infer_cluster_type("xds-grpc"), ClusterType::Static);
    }

    #[test]
    fn unparseable_unknown_name_falls_back_to_eds() {
        assert_eq!(infer_cluster_type("some_custom_cluster"), ClusterType::Eds);
    }
}
