//! RPC entrypoints as `#[async_trait]` traits over `navigator-grpc`'s
//! hand-declared wire types (spec.md §6): without a `tonic_build` pipeline
//! generating server traits from a `.proto`, these traits stand in for
//! what that pipeline would produce, so a real transport crate can adopt
//! them as a drop-in later.

use crate::frontend::Frontend;
use crate::wire::{ClusterSummary, GetProxyConfigResponse, ListServicesRequest};
use async_trait::async_trait;
use futures::Stream;
use navigator_core::istio::FilteredIstioResources;
use navigator_core::model::{AggregatedService, AggregatedServiceInstance};
use navigator_core::wire::{InboundFrame, OutboundFrame};
use navigator_core::NavError;
use navigator_hub::ConnectionManager;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// The bidirectional `Connect` stream (spec.md §4.D).
#[async_trait]
pub trait ConnectService: Send + Sync {
    async fn connect(
        &self,
        inbound: Pin<Box<dyn Stream<Item = Result<InboundFrame, NavError>> + Send>>,
        outbound: mpsc::Sender<OutboundFrame>,
        cancel: CancellationToken,
    ) -> Result<(), NavError>;
}

#[async_trait]
impl ConnectService for Arc<ConnectionManager> {
    async fn connect(
        &self,
        inbound: Pin<Box<dyn Stream<Item = Result<InboundFrame, NavError>> + Send>>,
        outbound: mpsc::Sender<OutboundFrame>,
        cancel: CancellationToken,
    ) -> Result<(), NavError> {
        self.serve_stream(inbound, outbound, cancel).await
    }
}

/// The five Frontend RPCs plus `ListClusters` (spec.md §4.F).
#[async_trait]
pub trait FrontendService: Send + Sync {
    fn list_services(&self, request: ListServicesRequest) -> Vec<AggregatedService>;
    fn get_service(&self, id: &str) -> Result<AggregatedService, NavError>;
    fn get_service_instance(&self, instance_id: &str) -> Result<AggregatedServiceInstance, NavError>;
    async fn get_proxy_config(&self, instance_id: &str) -> Result<GetProxyConfigResponse, NavError>;
    fn get_istio_resources(
        &self,
        service_id: &str,
        instance_id: &str,
    ) -> Result<FilteredIstioResources, NavError>;
    fn list_clusters(&self) -> Vec<ClusterSummary>;
}

#[async_trait]
impl FrontendService for Frontend {
    fn list_services(&self, request: ListServicesRequest) -> Vec<AggregatedService> {
        Frontend::list_services(self, request.namespace.as_deref(), request.cluster_id.as_deref())
    }

    fn get_service(&self, id: &str) -> Result<AggregatedService, NavError> {
        Frontend::get_service(self, id)
    }

    fn get_service_instance(&self, instance_id: &str) -> Result<AggregatedServiceInstance, NavError> {
        Frontend::get_service_instance(self, instance_id)
    }

    async fn get_proxy_config(&self, instance_id: &str) -> Result<GetProxyConfigResponse, NavError> {
        Frontend::get_proxy_config(self, instance_id).await
    }

    fn get_istio_resources(
        &self,
        service_id: &str,
        instance_id: &str,
    ) -> Result<FilteredIstioResources, NavError> {
        Frontend::get_istio_resources(self, service_id, instance_id)
    }

    fn list_clusters(&self) -> Vec<ClusterSummary> {
        Frontend::list_clusters(self)
    }
}
