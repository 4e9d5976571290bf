//! `DestinationRule` filter (spec.md §4.A): namespace visibility, then
//! workload selector (empty/nil matches all). Host-based filtering is
//! reserved but not yet enforced — all hosts are accepted.

use crate::common::{is_visible_to_namespace, selector_matches};
use navigator_core::istio::DestinationRule;
use navigator_core::ServiceInstance;

pub fn filter(
    rules: &[DestinationRule],
    instance: &ServiceInstance,
    workload_namespace: &str,
) -> Vec<DestinationRule> {
    rules
        .iter()
        .filter(|r| {
            is_visible_to_namespace(&r.export_to, &r.namespace, workload_namespace)
                && selector_matches(&r.selector, &instance.labels)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_and_selector_both_apply() {
        let instance = ServiceInstance {
            namespace: "default".to_string(),
            ..Default::default()
        };
        let rules = vec![
            DestinationRule {
                name: "visible".to_string(),
                namespace: "default".to_string(),
                export_to: vec![],
                selector: Default::default(),
            },
            DestinationRule {
                name: "hidden".to_string(),
                namespace: "other".to_string(),
                export_to: vec![".".to_string()],
                selector: Default::default(),
            },
        ];
        let matched = filter(&rules, &instance, "default");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "visible");
    }
}
