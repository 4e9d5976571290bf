//! Filter composition (spec.md §4.A, "Composition (`IstioResourceService`)").

use crate::common::derive_gateway_names;
use crate::{destination_rule, gateway, scoped, service_entry, sidecar, virtual_service};
use navigator_core::istio::{FilteredIstioResources, IstioResources, NamedResource};
use navigator_core::model::ControlPlaneConfig;
use navigator_core::ServiceInstance;

/// Runs all ten per-resource-type filters against one workload instance
/// and merges the gateway-induced `VirtualService` sweep.
///
/// `serves_service` is the name of the `Service` this query resolved the
/// workload through (not derived from the instance id — see spec.md §9's
/// open question about `extractServiceNameFromInstanceID`); it's
/// consulted only by `Service` target-ref matching.
///
/// The ten filters are independent pure functions over small, already
/// in-memory slices; running them sequentially here is deliberate —
/// spawning a thread per filter would cost more than the filters
/// themselves on the resource-collection sizes this composition sees.
/// Output ordering within each resource type is a stable function of
/// input ordering because every filter is a straight `.filter().cloned()`
/// over the input slice (spec.md §8, testable property 5: idempotence).
pub fn resolve_for_workload(
    resources: &IstioResources,
    instance: &ServiceInstance,
    workload_namespace: &str,
    control_plane: &ControlPlaneConfig,
    serves_service: Option<&str>,
) -> FilteredIstioResources {
    let workload_gateway_names = derive_gateway_names(instance);
    let workload_is_gateway = instance.proxy_type.is_gateway();

    let gateways = gateway::filter(
        &resources.gateways,
        instance,
        workload_namespace,
        control_plane.pilot_scope_gateway_to_namespace,
    );

    let mut virtual_services = virtual_service::filter(
        &resources.virtual_services,
        workload_namespace,
        workload_is_gateway,
        &workload_gateway_names,
    );
    let swept = virtual_service::filter_for_matching_gateways(
        &resources.virtual_services,
        &gateways,
        workload_namespace,
    );
    merge_by_key(&mut virtual_services, swept);

    let sidecars = sidecar::filter(&resources.sidecars, instance, workload_namespace);
    let destination_rules =
        destination_rule::filter(&resources.destination_rules, instance, workload_namespace);
    let service_entries = service_entry::filter(&resources.service_entries, workload_namespace);

    let envoy_filters = scoped::filter(
        &resources.envoy_filters,
        instance,
        workload_namespace,
        &control_plane.root_namespace,
        &workload_gateway_names,
        serves_service,
    );
    let request_authentications = scoped::filter(
        &resources.request_authentications,
        instance,
        workload_namespace,
        &control_plane.root_namespace,
        &workload_gateway_names,
        serves_service,
    );
    let peer_authentications = scoped::filter(
        &resources.peer_authentications,
        instance,
        workload_namespace,
        &control_plane.root_namespace,
        &workload_gateway_names,
        serves_service,
    );
    let authorization_policies = scoped::filter(
        &resources.authorization_policies,
        instance,
        workload_namespace,
        &control_plane.root_namespace,
        &workload_gateway_names,
        serves_service,
    );
    let wasm_plugins = scoped::filter(
        &resources.wasm_plugins,
        instance,
        workload_namespace,
        &control_plane.root_namespace,
        &workload_gateway_names,
        serves_service,
    );

    FilteredIstioResources {
        virtual_services,
        destination_rules,
        gateways,
        sidecars,
        envoy_filters,
        request_authentications,
        peer_authentications,
        authorization_policies,
        wasm_plugins,
        service_entries,
    }
}

/// Merges `additional` into `base` keyed by `namespace/name`; first
/// occurrence wins (spec.md §4.A).
fn merge_by_key<T: NamedResource + Clone>(base: &mut Vec<T>, additional: Vec<T>) {
    let mut seen: ahash::AHashSet<String> = base.iter().map(|r| r.key()).collect();
    for item in additional {
        let key = item.key();
        if seen.insert(key) {
            base.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navigator_core::istio::{Gateway, VirtualService};
    use navigator_core::model::ProxyType;

    #[test]
    fn gateway_workload_pulls_in_swept_virtual_service() {
        let resources = IstioResources {
            gateways: vec![Gateway {
                name: "ingress".to_string(),
                namespace: "istio-system".to_string(),
                selector: ahash::AHashMap::from_iter([(
                    "app".to_string(),
                    "istio-ingressgateway".to_string(),
                )]),
            }],
            virtual_services: vec![VirtualService {
                name: "web-vs".to_string(),
                namespace: "istio-system".to_string(),
                export_to: vec![],
                gateways: vec!["ingress".to_string()],
            }],
            ..Default::default()
        };
        let instance = ServiceInstance {
            namespace: "istio-system".to_string(),
            proxy_type: ProxyType::Gateway,
            labels: ahash::AHashMap::from_iter([(
                "app".to_string(),
                "istio-ingressgateway".to_string(),
            )]),
            ..Default::default()
        };
        let control_plane = ControlPlaneConfig::default();
        let result =
            resolve_for_workload(&resources, &instance, "istio-system", &control_plane, None);
        assert_eq!(result.gateways.len(), 1);
        assert_eq!(result.virtual_services.len(), 1);
    }

    #[test]
    fn root_namespace_request_authentication_matches_every_namespace() {
        let resources = IstioResources {
            request_authentications: vec![navigator_core::istio::RequestAuthentication {
                name: "mesh-jwt".to_string(),
                namespace: "istio-system".to_string(),
                selector: None,
                target_refs: vec![],
            }],
            ..Default::default()
        };
        let instance = ServiceInstance {
            namespace: "team-a".to_string(),
            ..Default::default()
        };
        let control_plane = ControlPlaneConfig {
            root_namespace: "istio-system".to_string(),
            ..Default::default()
        };
        let result = resolve_for_workload(&resources, &instance, "team-a", &control_plane, None);
        assert_eq!(result.request_authentications.len(), 1);
    }
}
