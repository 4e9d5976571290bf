//! Prometheus counters for resource-filter invocations (SPEC_FULL.md
//! §4.A ambient addition), registered by `navigator-runtime` the way
//! `linkerd-policy-controller-k8s-index::metrics::IndexMetrics` registers
//! index counters.

use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::{counter::Counter, family::Family};
use prometheus_client::registry::Registry;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct ResourceTypeLabel {
    resource_type: &'static str,
}

#[derive(Clone, Debug)]
pub struct FilterMetrics {
    invocations: Family<ResourceTypeLabel, Counter>,
    matched: Family<ResourceTypeLabel, Counter>,
}

impl FilterMetrics {
    pub fn register(registry: &mut Registry) -> Self {
        let invocations = Family::default();
        registry.register(
            "filter_invocations",
            "Count of resource-filter evaluations, by resource type",
            invocations.clone(),
        );

        let matched = Family::default();
        registry.register(
            "filter_matched",
            "Count of resources that matched a filter, by resource type",
            matched.clone(),
        );

        Self {
            invocations,
            matched,
        }
    }

    pub fn observe(&self, resource_type: &'static str, total: usize, matched_count: usize) {
        self.invocations
            .get_or_create(&ResourceTypeLabel { resource_type })
            .inc_by(total as u64);
        self.matched
            .get_or_create(&ResourceTypeLabel { resource_type })
            .inc_by(matched_count as u64);
    }
}
