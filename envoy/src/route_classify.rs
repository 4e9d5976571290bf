//! Route-type classification (spec.md §4.B).

use crate::types::RouteType;
use regex::Regex;
use std::sync::OnceLock;

const STATIC_NAMES: &[&str] = &[
    "InboundPassthroughCluster",
    "BlackHoleCluster",
    "PassthroughCluster",
];

fn inbound_outbound_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(inbound|outbound)\|\d+\|\|.*$").unwrap())
}

fn port_only_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[1-9]\d{0,4}$").unwrap())
}

pub fn classify_route_name(name: &str, is_static: bool) -> RouteType {
    let trimmed = name.trim();
    if is_static || trimmed.is_empty() || STATIC_NAMES.contains(&trimmed) {
        return RouteType::Static;
    }
    if inbound_outbound_pattern().is_match(trimmed) {
        return RouteType::Static;
    }
    if port_only_pattern().is_match(trimmed) {
        if let Ok(port) = trimmed.parse::<u32>() {
            if port > 0 && port <= 65535 {
                return RouteType::PortBased;
            }
        }
    }
    RouteType::ServiceSpecific
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_route_config_is_always_static() {
        assert_eq!(classify_route_name("80", true), RouteType::Static);
    }

    #[test]
    fn known_static_names_are_static() {
        assert_eq!(
            classify_route_name("PassthroughCluster", false),
            RouteType::Static
        );
        assert_eq!(classify_route_name("   ", false), RouteType::Static);
    }

    #[test]
    fn inbound_outbound_prefixed_names_are_static() {
        assert_eq!(
            classify_route_name("inbound|9080||", false),
            RouteType::Static
        );
    }

    #[test]
    fn bare_port_number_is_port_based() {
        assert_eq!(classify_route_name("8080", false), RouteType::PortBased);
    }

    #[test]
    fn out_of_range_port_falls_through_to_service_specific() {
        assert_eq!(
            classify_route_name("99999", false),
            RouteType::ServiceSpecific
        );
    }

    #[test]
    fn named_http_route_is_service_specific() {
        assert_eq!(
            classify_route_name("reviews.default.svc.cluster.local:9080", false),
            RouteType::ServiceSpecific
        );
    }
}
