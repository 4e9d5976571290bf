//! `Gateway` filter (spec.md §4.A): selector must match workload labels;
//! if `scopeGatewayToNamespace` is true, the gateway's namespace must
//! equal the workload's namespace.

use crate::common::selector_matches;
use navigator_core::istio::Gateway;
use navigator_core::ServiceInstance;

pub fn filter(
    gateways: &[Gateway],
    instance: &ServiceInstance,
    workload_namespace: &str,
    scope_to_namespace: bool,
) -> Vec<Gateway> {
    gateways
        .iter()
        .filter(|gw| {
            if scope_to_namespace && gw.namespace != workload_namespace {
                return false;
            }
            selector_matches(&gw.selector, &instance.labels)
        })
        .cloned()
        .collect()
}
