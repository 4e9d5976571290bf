//! Predicates shared by more than one per-resource filter (spec.md
//! §4.A, "Common predicates").

use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use navigator_core::istio::Selector;
use navigator_core::ServiceInstance;

/// `exportTo` visibility law (spec.md §4.A, §8 testable property 6):
/// empty/nil ⇒ visible to all; `"*"` ⇒ all; `"."` ⇒ same namespace as the
/// resource; anything else ⇒ that specific namespace.
pub fn is_visible_to_namespace(export_to: &[String], resource_namespace: &str, ns: &str) -> bool {
    if export_to.is_empty() {
        return true;
    }
    export_to.iter().any(|entry| match entry.as_str() {
        "*" => true,
        "." => resource_namespace == ns,
        other => other == ns,
    })
}

/// Label-selector match (spec.md §4.A): an empty/nil selector matches
/// all workloads; otherwise every selector key must be present in the
/// workload's labels with an equal value.
pub fn selector_matches(selector: &Selector, workload_labels: &HashMap<String, String>) -> bool {
    selector
        .iter()
        .all(|(k, v)| workload_labels.get(k).is_some_and(|wv| wv == v))
}

const INGRESSGATEWAY_APP: &str = "istio-ingressgateway";
const EGRESSGATEWAY_APP: &str = "istio-egressgateway";
const INGRESSGATEWAY_LABEL: &str = "ingressgateway";

/// Derives the set of gateway names a workload answers to, from its
/// labels (spec.md §4.A, "Gateway-name derivation from workload"):
/// the literal `istio.io/gateway-name` label value, its
/// namespace-prefixed form, and for the well-known ingress/egress
/// gateway apps, their canonical names and namespace-prefixed forms.
pub fn derive_gateway_names(instance: &ServiceInstance) -> HashSet<String> {
    let mut names = HashSet::default();
    let ns = &instance.namespace;

    if let Some(name) = instance.labels.get("istio.io/gateway-name") {
        names.insert(name.clone());
        names.insert(format!("{ns}/{name}"));
    }

    let app = instance.labels.get("app").map(String::as_str);
    let istio = instance.labels.get("istio").map(String::as_str);

    if app == Some(INGRESSGATEWAY_APP) || istio == Some(INGRESSGATEWAY_LABEL) {
        names.insert(INGRESSGATEWAY_APP.to_string());
        names.insert(format!("{ns}/{INGRESSGATEWAY_APP}"));
    }
    if app == Some(EGRESSGATEWAY_APP) {
        names.insert(EGRESSGATEWAY_APP.to_string());
        names.insert(format!("{ns}/{EGRESSGATEWAY_APP}"));
    }

    names
}
