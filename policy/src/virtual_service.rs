//! `VirtualService` filter (spec.md §4.A): namespace visibility, then
//! traffic context (mesh vs. gateway-bound), plus the secondary
//! gateway-induced sweep.

use crate::common::is_visible_to_namespace;
use ahash::AHashSet as HashSet;
use navigator_core::istio::{Gateway, NamedResource, VirtualService};

const MESH: &str = "mesh";

fn gateway_names(vs: &VirtualService) -> Vec<&str> {
    if vs.gateways.is_empty() {
        vec![MESH]
    } else {
        vs.gateways.iter().map(String::as_str).collect()
    }
}

/// Stage 1 (namespace visibility) + stage 2 (traffic context).
pub fn filter(
    virtual_services: &[VirtualService],
    workload_namespace: &str,
    workload_is_gateway: bool,
    workload_gateway_names: &HashSet<String>,
) -> Vec<VirtualService> {
    virtual_services
        .iter()
        .filter(|vs| {
            if !is_visible_to_namespace(&vs.export_to, &vs.namespace, workload_namespace) {
                return false;
            }
            let names = gateway_names(vs);
            if workload_is_gateway {
                names
                    .iter()
                    .filter(|n| **n != MESH)
                    .any(|n| workload_gateway_names.contains(*n))
            } else {
                names.contains(&MESH)
            }
        })
        .cloned()
        .collect()
}

/// `filterVirtualServicesForMatchingGateways` (spec.md §4.A): given the
/// already-matched `Gateway` set, add any `VirtualService` that
/// references one of them by bare or namespaced name, subject to
/// namespace visibility.
pub fn filter_for_matching_gateways(
    all_virtual_services: &[VirtualService],
    matched_gateways: &[Gateway],
    workload_namespace: &str,
) -> Vec<VirtualService> {
    let mut keys = HashSet::default();
    for gw in matched_gateways {
        keys.insert(gw.name.clone());
        keys.insert(gw.key());
    }

    all_virtual_services
        .iter()
        .filter(|vs| {
            is_visible_to_namespace(&vs.export_to, &vs.namespace, workload_namespace)
                && gateway_names(vs).iter().any(|n| keys.contains(*n))
        })
        .cloned()
        .collect()
}
