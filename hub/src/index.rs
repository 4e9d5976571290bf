//! The read-optimized aggregated index (spec.md §4.C).
//!
//! Rebuilt wholesale on every ingest and published through `ArcSwap` so a
//! `list`/`get` never observes a partial rebuild and never blocks the
//! writer — the same atomic-pointer-swap discipline the design notes call
//! for (spec.md §9, "represent as indices into arena vectors ... rebuild as
//! an atomic replacement, not mutation in place").

use ahash::AHashMap;
use arc_swap::ArcSwap;
use navigator_core::model::{AggregatedService, AggregatedServiceInstance, ClusterState};
use navigator_core::{ClusterId, ConnectionInfo};
use std::sync::Arc;

#[derive(Default)]
struct Snapshot {
    by_id: AHashMap<String, AggregatedService>,
    /// Insertion order of `by_id` keys, so `list()` output is a stable
    /// function of ingest order rather than hash-map iteration order.
    order: Vec<String>,
    by_instance_id: AHashMap<String, AggregatedServiceInstance>,
    connections: AHashMap<ClusterId, ConnectionInfo>,
}

pub struct AggregatedIndex {
    inner: ArcSwap<Snapshot>,
}

impl Default for AggregatedIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregatedIndex {
    pub fn new() -> Self {
        Self {
            inner: ArcSwap::from_pointee(Snapshot::default()),
        }
    }

    /// Rebuilds the index from every currently-connected cluster's last
    /// known state and publishes it atomically.
    pub fn rebuild<'a>(
        &self,
        clusters: impl Iterator<Item = (&'a ClusterId, &'a ClusterState, ConnectionInfo)>,
    ) {
        let mut by_id: AHashMap<String, AggregatedService> = AHashMap::new();
        let mut order = Vec::new();
        let mut by_instance_id = AHashMap::new();
        let mut connections = AHashMap::new();

        for (cluster_id, state, conn) in clusters {
            connections.insert(cluster_id.clone(), conn);
            for svc in &state.services {
                let id = svc.id();
                let entry = by_id.entry(id.clone()).or_insert_with(|| {
                    order.push(id.clone());
                    AggregatedService {
                        name: svc.name.clone(),
                        namespace: svc.namespace.clone(),
                        instances: Vec::new(),
                    }
                });
                for instance in &svc.instances {
                    by_instance_id.insert(instance.instance_id(), instance.clone());
                    entry.instances.push(instance.clone());
                }
            }
        }

        self.inner.store(Arc::new(Snapshot {
            by_id,
            order,
            by_instance_id,
            connections,
        }));
    }

    /// Filtered scan; `None` for either filter means "no restriction".
    /// `cluster_id` restricts to services with at least one instance from
    /// that cluster (the service's full instance set is still returned,
    /// across all clusters it's reported from).
    pub fn list(
        &self,
        namespace: Option<&str>,
        cluster_id: Option<&ClusterId>,
    ) -> Vec<AggregatedService> {
        let snapshot = self.inner.load();
        snapshot
            .order
            .iter()
            .filter_map(|id| snapshot.by_id.get(id))
            .filter(|svc| namespace.map_or(true, |ns| svc.namespace == ns))
            .filter(|svc| {
                cluster_id.map_or(true, |cid| svc.instances.iter().any(|i| &i.cluster_id == cid))
            })
            .cloned()
            .collect()
    }

    pub fn get_service(&self, id: &str) -> Option<AggregatedService> {
        self.inner.load().by_id.get(id).cloned()
    }

    pub fn get_instance(&self, instance_id: &str) -> Option<AggregatedServiceInstance> {
        self.inner.load().by_instance_id.get(instance_id).cloned()
    }

    pub fn connections(&self) -> AHashMap<ClusterId, ConnectionInfo> {
        self.inner.load().connections.clone()
    }
}
