//! `ServiceEntry` filter (spec.md §4.A): namespace visibility only.

use crate::common::is_visible_to_namespace;
use navigator_core::istio::ServiceEntry;

pub fn filter(entries: &[ServiceEntry], workload_namespace: &str) -> Vec<ServiceEntry> {
    entries
        .iter()
        .filter(|e| is_visible_to_namespace(&e.export_to, &e.namespace, workload_namespace))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_visibility_only() {
        let entries = vec![
            ServiceEntry {
                name: "a".to_string(),
                namespace: "default".to_string(),
                export_to: vec![],
            },
            ServiceEntry {
                name: "b".to_string(),
                namespace: "other".to_string(),
                export_to: vec!["team-x".to_string()],
            },
        ];
        let matched = filter(&entries, "default");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "a");
    }
}
