//! The Istio query service (spec.md §4.G, component G): composes
//! `navigator-policy`'s filters over a cluster's stored Istio resources
//! for one workload instance.

use navigator_core::istio::{FilteredIstioResources, IstioResources};
use navigator_core::model::ServiceInstance;
use navigator_core::{ClusterId, NavError};
use navigator_hub::ConnectionManager;
use navigator_policy::metrics::FilterMetrics;
use std::sync::Arc;

pub struct IstioQueryService {
    manager: Arc<ConnectionManager>,
    metrics: Option<Arc<FilterMetrics>>,
}

impl IstioQueryService {
    pub fn new(manager: Arc<ConnectionManager>, metrics: Option<Arc<FilterMetrics>>) -> Self {
        Self { manager, metrics }
    }

    /// Runs every resource filter for `instance` against `cluster_id`'s
    /// last-ingested state. `serves_service` should be the name of the
    /// `Service` the caller already resolved the instance through (spec.md
    /// §9's resolution of the `extractServiceNameFromInstanceID` gap), not
    /// derived from the instance id.
    pub fn resolve(
        &self,
        cluster_id: &ClusterId,
        instance: &ServiceInstance,
        workload_namespace: &str,
        serves_service: Option<&str>,
    ) -> Result<FilteredIstioResources, NavError> {
        let state = self
            .manager
            .cluster_state(cluster_id)
            .ok_or_else(|| NavError::cluster_unknown(cluster_id))?;

        let result = navigator_policy::resolve_for_workload(
            &state.istio_resources,
            instance,
            workload_namespace,
            &state.control_plane,
            serves_service,
        );

        if let Some(metrics) = &self.metrics {
            observe(metrics, &state.istio_resources, &result);
        }

        Ok(result)
    }
}

fn observe(metrics: &FilterMetrics, total: &IstioResources, matched: &FilteredIstioResources) {
    metrics.observe("VirtualService", total.virtual_services.len(), matched.virtual_services.len());
    metrics.observe("DestinationRule", total.destination_rules.len(), matched.destination_rules.len());
    metrics.observe("Gateway", total.gateways.len(), matched.gateways.len());
    metrics.observe("Sidecar", total.sidecars.len(), matched.sidecars.len());
    metrics.observe("EnvoyFilter", total.envoy_filters.len(), matched.envoy_filters.len());
    metrics.observe(
        "RequestAuthentication",
        total.request_authentications.len(),
        matched.request_authentications.len(),
    );
    metrics.observe(
        "PeerAuthentication",
        total.peer_authentications.len(),
        matched.peer_authentications.len(),
    );
    metrics.observe(
        "AuthorizationPolicy",
        total.authorization_policies.len(),
        matched.authorization_policies.len(),
    );
    metrics.observe("WasmPlugin", total.wasm_plugins.len(), matched.wasm_plugins.len());
    metrics.observe("ServiceEntry", total.service_entries.len(), matched.service_entries.len());
}
