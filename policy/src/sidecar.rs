//! `Sidecar` filter (spec.md §4.A): namespace-scoped — the sidecar's
//! namespace must equal the workload's namespace; selector must match
//! (empty matches all).

use crate::common::selector_matches;
use navigator_core::istio::Sidecar;
use navigator_core::ServiceInstance;

pub fn filter(sidecars: &[Sidecar], instance: &ServiceInstance, workload_namespace: &str) -> Vec<Sidecar> {
    sidecars
        .iter()
        .filter(|sc| sc.namespace == workload_namespace && selector_matches(&sc.selector, &instance.labels))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_scoped() {
        let instance = ServiceInstance {
            namespace: "default".to_string(),
            ..Default::default()
        };
        let sidecars = vec![
            Sidecar {
                name: "default".to_string(),
                namespace: "default".to_string(),
                selector: Default::default(),
            },
            Sidecar {
                name: "other-ns".to_string(),
                namespace: "other".to_string(),
                selector: Default::default(),
            },
        ];
        let matched = filter(&sidecars, &instance, "default");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "default");
    }
}
