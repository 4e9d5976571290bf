//! The Frontend query service (spec.md §4.F): `ListServices`,
//! `GetService`, `GetServiceInstance`, `GetProxyConfig`,
//! `GetIstioResources`, and `ListClusters`.
//!
//! A concrete struct rather than generic over the hub's query surface —
//! `ConnectionManager` and `ProxyConfigBroker` are the only implementations
//! that exist or are ever likely to, so the generic parameter the original
//! design note sketches would buy nothing a direct `Arc` doesn't already
//! give.

use crate::istio::IstioQueryService;
use crate::wire::{ClusterSummary, GetProxyConfigResponse};
use chrono::Utc;
use navigator_core::istio::FilteredIstioResources;
use navigator_core::model::{AggregatedService, AggregatedServiceInstance, InstanceIdParts};
use navigator_core::{ClusterId, NavError, SyncStatus};
use navigator_hub::{ConnectionManager, ProxyConfigBroker};
use std::str::FromStr;
use std::sync::Arc;

pub struct Frontend {
    manager: Arc<ConnectionManager>,
    broker: Arc<ProxyConfigBroker>,
    istio: IstioQueryService,
}

impl Frontend {
    pub fn new(manager: Arc<ConnectionManager>, broker: Arc<ProxyConfigBroker>, istio: IstioQueryService) -> Self {
        Self { manager, broker, istio }
    }

    pub fn list_services(&self, namespace: Option<&str>, cluster_id: Option<&str>) -> Vec<AggregatedService> {
        let cluster_id = cluster_id.map(ClusterId::from);
        self.manager.index().list(namespace, cluster_id.as_ref())
    }

    pub fn get_service(&self, id: &str) -> Result<AggregatedService, NavError> {
        self.manager
            .index()
            .get_service(id)
            .ok_or_else(|| NavError::NotFound(format!("no such service: {id}")))
    }

    pub fn get_service_instance(&self, instance_id: &str) -> Result<AggregatedServiceInstance, NavError> {
        self.manager
            .index()
            .get_instance(instance_id)
            .ok_or_else(|| NavError::NotFound(format!("no such service instance: {instance_id}")))
    }

    pub async fn get_proxy_config(&self, instance_id: &str) -> Result<GetProxyConfigResponse, NavError> {
        let parts = InstanceIdParts::from_str(instance_id)?;
        self.manager
            .index()
            .get_instance(instance_id)
            .ok_or_else(|| NavError::NotFound(format!("no such service instance: {instance_id}")))?;

        let (raw, version) = self
            .broker
            .get_proxy_config(&parts.cluster_id, &parts.namespace, &parts.pod_name)
            .await?;

        let text = String::from_utf8(raw.clone())
            .map_err(|e| NavError::Internal(format!("proxy config is not valid utf-8: {e}")))?;
        let parsed = navigator_envoy::parse_config_dump(&text)?;

        Ok(GetProxyConfigResponse { raw, version, parsed })
    }

    /// Resolves `serves_service` from the already-indexed service name
    /// (spec.md §9), not by parsing the instance id.
    pub fn get_istio_resources(
        &self,
        service_id: &str,
        instance_id: &str,
    ) -> Result<FilteredIstioResources, NavError> {
        let instance = self.get_service_instance(instance_id)?;
        let service = self.get_service(service_id)?;
        self.istio.resolve(
            &instance.cluster_id,
            &instance,
            &instance.namespace,
            Some(service.name.as_str()),
        )
    }

    pub fn list_clusters(&self) -> Vec<ClusterSummary> {
        let now = Utc::now();
        self.manager
            .index()
            .connections()
            .into_values()
            .map(|info| ClusterSummary {
                cluster_id: info.cluster_id.to_string(),
                connected_at: info.connected_at,
                last_update: info.last_update,
                service_count: i32::try_from(info.service_count).unwrap_or(i32::MAX),
                sync_status: SyncStatus::derive(info.last_update, now).as_str(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use navigator_core::model::{ClusterState, ControlPlaneConfig, ProxyType, Service, ServiceInstance};
    use navigator_core::wire::{ClusterIdentification, InboundFrame};
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    async fn connect_cluster(manager: &Arc<ConnectionManager>, cluster_id: &str, state: ClusterState) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(8);
        let cancel = CancellationToken::new();
        let m2 = manager.clone();
        let c2 = cancel.clone();
        let id = cluster_id.to_string();
        tokio::spawn(async move {
            let inbound = stream::iter(vec![
                Ok(InboundFrame::Identification(ClusterIdentification { cluster_id: id })),
                Ok(InboundFrame::State(state)),
            ]);
            let _ = m2.serve_stream(inbound, tx, c2).await;
        });
        let _ = rx.recv().await;
        let cid = ClusterId::from(cluster_id);
        for _ in 0..50 {
            if manager.cluster_state(&cid).is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        cancel.cancel();
    }

    fn instance(cluster: &str, pod: &str) -> ServiceInstance {
        ServiceInstance {
            cluster_id: ClusterId::from(cluster),
            pod_name: pod.to_string(),
            namespace: "default".to_string(),
            proxy_type: ProxyType::Sidecar,
            created_at: Utc::now(),
            ..Default::default()
        }
    }

    fn state(instances: Vec<ServiceInstance>) -> ClusterState {
        ClusterState {
            services: vec![Service {
                name: "web".to_string(),
                namespace: "default".to_string(),
                instances,
            }],
            istio_resources: Default::default(),
            control_plane: ControlPlaneConfig::default(),
        }
    }

    fn frontend(manager: Arc<ConnectionManager>) -> Frontend {
        let broker = Arc::new(ProxyConfigBroker::new(Arc::downgrade(
            &(manager.clone() as Arc<dyn navigator_hub::ClusterRouter>),
        )));
        let istio = IstioQueryService::new(manager.clone(), None);
        Frontend::new(manager, broker, istio)
    }

    #[tokio::test]
    async fn list_and_get_service_round_trip() {
        let manager = Arc::new(ConnectionManager::new());
        connect_cluster(&manager, "c1", state(vec![instance("c1", "pod-a")])).await;

        let fe = frontend(manager);
        let all = fe.list_services(None, None);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id(), "default:web");

        let svc = fe.get_service("default:web").unwrap();
        assert_eq!(svc.instances.len(), 1);

        let err = fe.get_service("default:ghost").unwrap_err();
        assert!(matches!(err, NavError::NotFound(_)));
    }

    #[tokio::test]
    async fn get_service_instance_round_trip() {
        let manager = Arc::new(ConnectionManager::new());
        connect_cluster(&manager, "c1", state(vec![instance("c1", "pod-a")])).await;

        let fe = frontend(manager);
        let instance = fe.get_service_instance("c1:default:pod-a").unwrap();
        assert_eq!(instance.pod_name, "pod-a");
        assert!(fe.get_service_instance("c9:default:pod-a").is_err());
    }

    #[tokio::test]
    async fn list_clusters_reports_connection_info() {
        let manager = Arc::new(ConnectionManager::new());
        connect_cluster(&manager, "c1", state(vec![instance("c1", "pod-a")])).await;

        let fe = frontend(manager);
        let clusters = fe.list_clusters();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].cluster_id, "c1");
        assert_eq!(clusters[0].sync_status, "HEALTHY");
        assert_eq!(clusters[0].service_count, 1);
    }

    #[tokio::test]
    async fn get_proxy_config_rejects_malformed_instance_id() {
        let manager = Arc::new(ConnectionManager::new());
        let fe = frontend(manager);
        let err = fe.get_proxy_config("not-an-id").await.unwrap_err();
        assert!(matches!(err, NavError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn get_proxy_config_rejects_unknown_instance() {
        let manager = Arc::new(ConnectionManager::new());
        let fe = frontend(manager);
        let err = fe.get_proxy_config("c1:default:pod-a").await.unwrap_err();
        assert!(matches!(err, NavError::NotFound(_)));
    }
}
