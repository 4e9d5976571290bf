//! Istio cluster-name parsing: `<direction>|<port>|<subset>|<fqdn>`
//! (spec.md §4.B, "Istio cluster-name parse").

use crate::types::{ClusterNameParts, Direction};

pub fn parse_istio_cluster_name(name: &str) -> ClusterNameParts {
    let parts: Vec<&str> = name.split('|').collect();
    if parts.len() != 4 {
        return ClusterNameParts::default();
    }
    let direction = match parts[0].to_ascii_lowercase().as_str() {
        "inbound" => Some(Direction::Inbound),
        "outbound" => Some(Direction::Outbound),
        _ => Some(Direction::Unspecified),
    };
    let port = parts[1].parse().unwrap_or(0);
    ClusterNameParts {
        direction,
        port,
        subset: parts[2].to_string(),
        fqdn: parts[3].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_outbound_name() {
        let parts = parse_istio_cluster_name("outbound|9080|v1|reviews.default.svc.cluster.local");
        assert_eq!(parts.direction, Some(Direction::Outbound));
        assert_eq!(parts.port, 9080);
        assert_eq!(parts.subset, "v1");
        assert_eq!(parts.fqdn, "reviews.default.svc.cluster.local");
    }

    #[test]
    fn unparseable_name_leaves_defaults() {
        let parts = parse_istio_cluster_name("prometheus_stats");
        assert_eq!(parts.direction, None);
        assert_eq!(parts.port, 0);
        assert_eq!(parts.subset, "");
        assert_eq!(parts.fqdn, "");
    }

    #[test]
    fn extra_pipe_count_is_unparseable() {
        let parts = parse_istio_cluster_name("a|b|c|d|e");
        assert_eq!(parts.direction, None);
    }
}
