//! The Connection Manager (spec.md §4.D): one bidirectional stream per
//! cluster, an authoritative per-cluster state store, and outbound message
//! routing.
//!
//! Modeled on `linkerd-tap-controller`'s bidirectional-stream service
//! pattern: one dedicated outbound `tokio::sync::mpsc` channel per connected
//! edge, a `tokio_util::sync::CancellationToken` per stream for cooperative
//! cancellation, and a `parking_lot::RwLock`-guarded stream table — distinct
//! from the read-mostly aggregated index, which is written only as a whole
//! replacement (spec.md §5).

use crate::index::AggregatedIndex;
use ahash::AHashMap;
use chrono::Utc;
use futures::Stream;
use navigator_core::model::ClusterState;
use navigator_core::wire::{
    ClusterIdentification, ConnectionAck, ErrorCode, ErrorMessage, InboundFrame, OutboundFrame,
    ProxyConfigRequest,
};
use navigator_core::{ClusterId, ConnectionInfo, NavError, SyncStatus};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use futures::StreamExt as _;

struct ClusterHandle {
    outbound: mpsc::Sender<OutboundFrame>,
    cancel: CancellationToken,
    connected_at: chrono::DateTime<Utc>,
    last_update: chrono::DateTime<Utc>,
    last_state: Option<ClusterState>,
}

/// Implemented by `ConnectionManager` for the proxy-config broker (hub::
/// broker), so the broker can route requests without owning the manager's
/// concrete type — avoiding the `Manager -> Broker -> Manager` reference
/// cycle a direct `Arc<ConnectionManager>` field would create.
pub trait ClusterRouter: Send + Sync {
    fn send_to_cluster(&self, cluster_id: &ClusterId, request: ProxyConfigRequest) -> Result<(), NavError>;
}

pub struct ConnectionManager {
    table: parking_lot::RwLock<AHashMap<ClusterId, ClusterHandle>>,
    index: AggregatedIndex,
    /// Bound once at startup by `navigator-runtime`'s wiring (the broker is
    /// constructed after the manager, since it holds a `Weak` back-reference
    /// to it). `None` only during that brief startup window.
    response_sink: std::sync::OnceLock<Arc<dyn ProxyConfigResponseSink>>,
}

/// Implemented by `hub::broker::ProxyConfigBroker` so the manager can
/// deliver inbound `ProxyConfigResponse` frames and cluster-disconnection
/// notices without depending on the broker's concrete type.
pub trait ProxyConfigResponseSink: Send + Sync {
    fn complete(&self, response: navigator_core::wire::ProxyConfigResponse);
    fn fail_cluster(&self, cluster_id: &ClusterId);
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            table: parking_lot::RwLock::new(AHashMap::new()),
            index: AggregatedIndex::new(),
            response_sink: std::sync::OnceLock::new(),
        }
    }

    pub fn index(&self) -> &AggregatedIndex {
        &self.index
    }

    /// Bound exactly once by the runtime after both the manager and the
    /// broker exist.
    pub fn bind_response_sink(&self, sink: Arc<dyn ProxyConfigResponseSink>) {
        let _ = self.response_sink.set(sink);
    }

    pub fn sync_status(&self, cluster_id: &ClusterId) -> Option<SyncStatus> {
        let table = self.table.read();
        table
            .get(cluster_id)
            .map(|h| SyncStatus::derive(h.last_update, Utc::now()))
    }

    /// The cluster's last-ingested state, for callers (the Istio query
    /// service) that need the raw resource collections the aggregated
    /// index doesn't retain.
    pub fn cluster_state(&self, cluster_id: &ClusterId) -> Option<ClusterState> {
        self.table.read().get(cluster_id).and_then(|h| h.last_state.clone())
    }

    /// Forcibly tears down a connected cluster's stream, e.g. from an
    /// admin operation. The stream task observes the cancellation at its
    /// next suspension point and the usual disconnect path (deregister,
    /// fail pending requests, index rebuild) runs from there.
    pub fn disconnect(&self, cluster_id: &ClusterId) -> Result<(), NavError> {
        let table = self.table.read();
        let handle = table
            .get(cluster_id)
            .ok_or_else(|| NavError::cluster_unknown(cluster_id))?;
        handle.cancel.cancel();
        Ok(())
    }

    /// Drives one edge connection end to end (spec.md §4.D steps 1-6).
    ///
    /// `inbound` is whatever the transport layer adapts its incoming
    /// `tonic::Streaming<ConnectRequest>` into; `outbound` is the sender
    /// half of a channel the transport drains into its response stream.
    #[instrument(skip_all)]
    pub async fn serve_stream(
        self: &Arc<Self>,
        mut inbound: impl Stream<Item = Result<InboundFrame, NavError>> + Unpin,
        outbound: mpsc::Sender<OutboundFrame>,
        cancel: CancellationToken,
    ) -> Result<(), NavError> {
        let cluster_id = match self.await_identification(&mut inbound, &outbound, &cancel).await {
            Ok(id) => id,
            Err(e) => return Err(e),
        };

        if let Err(e) = self.register(&cluster_id, outbound.clone(), cancel.clone()) {
            let _ = outbound.send(OutboundFrame::Ack(ConnectionAck { accepted: false })).await;
            return Err(e);
        }
        info!(%cluster_id, "cluster connected");
        self.rebuild_index();

        if outbound.send(OutboundFrame::Ack(ConnectionAck { accepted: true })).await.is_err() {
            self.deregister(&cluster_id);
            return Err(NavError::Disconnected(format!(
                "cluster {cluster_id} outbound channel closed before ack"
            )));
        }

        let result = self.message_loop(&cluster_id, &mut inbound, &outbound, &cancel).await;

        self.deregister(&cluster_id);
        info!(%cluster_id, "cluster disconnected");
        result
    }

    async fn await_identification(
        &self,
        inbound: &mut (impl Stream<Item = Result<InboundFrame, NavError>> + Unpin),
        outbound: &mpsc::Sender<OutboundFrame>,
        cancel: &CancellationToken,
    ) -> Result<ClusterId, NavError> {
        let first = tokio::select! {
            _ = cancel.cancelled() => None,
            item = inbound.next() => item,
        };
        match first {
            Some(Ok(InboundFrame::Identification(ClusterIdentification { cluster_id })))
                if !cluster_id.is_empty() =>
            {
                Ok(ClusterId::from(cluster_id))
            }
            _ => {
                let _ = outbound
                    .send(OutboundFrame::Error(ErrorMessage {
                        code: ErrorCode::InvalidClusterIdentification,
                        message: "first message must be ClusterIdentification with a non-empty clusterId".to_string(),
                    }))
                    .await;
                Err(NavError::InvalidArgument(
                    "missing or invalid ClusterIdentification".to_string(),
                ))
            }
        }
    }

    fn register(
        &self,
        cluster_id: &ClusterId,
        outbound: mpsc::Sender<OutboundFrame>,
        cancel: CancellationToken,
    ) -> Result<(), NavError> {
        let mut table = self.table.write();
        if table.contains_key(cluster_id) {
            warn!(%cluster_id, "rejecting duplicate cluster identification");
            return Err(NavError::AlreadyExists(format!(
                "cluster already connected: {cluster_id}"
            )));
        }
        let now = Utc::now();
        table.insert(
            cluster_id.clone(),
            ClusterHandle {
                outbound,
                cancel,
                connected_at: now,
                last_update: now,
                last_state: None,
            },
        );
        Ok(())
    }

    fn deregister(&self, cluster_id: &ClusterId) {
        let existed = self.table.write().remove(cluster_id).is_some();
        if existed {
            self.rebuild_index();
            if let Some(sink) = self.response_sink.get() {
                sink.fail_cluster(cluster_id);
            }
        }
    }

    async fn message_loop(
        self: &Arc<Self>,
        cluster_id: &ClusterId,
        inbound: &mut (impl Stream<Item = Result<InboundFrame, NavError>> + Unpin),
        outbound: &mpsc::Sender<OutboundFrame>,
        cancel: &CancellationToken,
    ) -> Result<(), NavError> {
        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(NavError::Disconnected(format!("cluster {cluster_id} cancelled")));
                }
                item = inbound.next() => item,
            };
            match next {
                Some(Ok(InboundFrame::State(state))) => {
                    debug!(%cluster_id, services = state.services.len(), "cluster state updated");
                    self.ingest_state(cluster_id, state);
                    self.rebuild_index();
                }
                Some(Ok(InboundFrame::ProxyConfigResponse(response))) => {
                    debug!(%cluster_id, request_id = %response.request_id, "proxy-config response received");
                    if let Some(sink) = self.response_sink.get() {
                        sink.complete(response);
                    }
                }
                Some(Ok(InboundFrame::Identification(_))) => {
                    let _ = outbound
                        .send(OutboundFrame::Error(ErrorMessage {
                            code: ErrorCode::MessageProcessingError,
                            message: "unexpected ClusterIdentification after registration".to_string(),
                        }))
                        .await;
                    return Err(NavError::InvalidArgument(
                        "re-identification after registration".to_string(),
                    ));
                }
                Some(Err(e)) => return Err(e),
                None => return Err(NavError::Disconnected(format!("cluster {cluster_id} stream closed"))),
            }
        }
    }

    fn ingest_state(&self, cluster_id: &ClusterId, state: ClusterState) {
        let mut table = self.table.write();
        if let Some(handle) = table.get_mut(cluster_id) {
            handle.last_update = Utc::now();
            handle.last_state = Some(state);
        }
    }

    fn rebuild_index(&self) {
        let table = self.table.read();
        let entries = table.iter().filter_map(|(id, handle)| {
            handle.last_state.as_ref().map(|state| {
                (
                    id,
                    state,
                    ConnectionInfo {
                        cluster_id: id.clone(),
                        connected_at: handle.connected_at,
                        last_update: handle.last_update,
                        service_count: state.services.len(),
                    },
                )
            })
        });
        self.index.rebuild(entries);
    }
}

impl ClusterRouter for ConnectionManager {
    fn send_to_cluster(&self, cluster_id: &ClusterId, request: ProxyConfigRequest) -> Result<(), NavError> {
        let table = self.table.read();
        let handle = table
            .get(cluster_id)
            .ok_or_else(|| NavError::cluster_unknown(cluster_id))?;
        handle
            .outbound
            .try_send(OutboundFrame::ProxyConfigRequest(request))
            .map_err(|e| NavError::Disconnected(format!("cluster {cluster_id} outbound full or closed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn identify(cluster_id: &str) -> Result<InboundFrame, NavError> {
        Ok(InboundFrame::Identification(ClusterIdentification {
            cluster_id: cluster_id.to_string(),
        }))
    }

    #[tokio::test]
    async fn registers_and_acks_on_valid_identification() {
        let manager = Arc::new(ConnectionManager::new());
        let (outbound_tx, mut outbound_rx) = mpsc::channel(8);
        let inbound = stream::iter(vec![identify("c1")]);
        let cancel = CancellationToken::new();
        let manager2 = manager.clone();
        let cancel2 = cancel.clone();
        let handle = tokio::spawn(async move {
            manager2.serve_stream(inbound, outbound_tx, cancel2).await
        });

        let ack = outbound_rx.recv().await.unwrap();
        assert!(matches!(ack, OutboundFrame::Ack(ConnectionAck { accepted: true })));

        cancel.cancel();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn duplicate_identification_is_rejected_while_first_is_live() {
        let manager = Arc::new(ConnectionManager::new());
        let (tx1, mut rx1) = mpsc::channel(8);
        let cancel1 = CancellationToken::new();
        let m1 = manager.clone();
        let c1 = cancel1.clone();
        let first = tokio::spawn(async move {
            m1.serve_stream(stream::iter(vec![identify("dup")]), tx1, c1).await
        });
        let _ = rx1.recv().await;

        let (tx2, mut rx2) = mpsc::channel(8);
        let cancel2 = CancellationToken::new();
        let result = manager
            .serve_stream(stream::iter(vec![identify("dup")]), tx2, cancel2)
            .await;
        assert!(matches!(result, Err(NavError::AlreadyExists(_))));
        assert!(matches!(
            rx2.recv().await,
            Some(OutboundFrame::Ack(ConnectionAck { accepted: false }))
        ));

        cancel1.cancel();
        let _ = first.await;
    }

    #[tokio::test]
    async fn missing_identification_closes_with_invalid_argument() {
        let manager = Arc::new(ConnectionManager::new());
        let (tx, mut rx) = mpsc::channel(8);
        let inbound = stream::iter(Vec::<Result<InboundFrame, NavError>>::new());
        let cancel = CancellationToken::new();
        let result = manager.serve_stream(inbound, tx, cancel).await;
        assert!(matches!(result, Err(NavError::InvalidArgument(_))));
        assert!(matches!(
            rx.recv().await,
            Some(OutboundFrame::Error(ErrorMessage {
                code: ErrorCode::InvalidClusterIdentification,
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn unknown_cluster_send_is_not_found() {
        let manager = ConnectionManager::new();
        let err = manager
            .send_to_cluster(
                &ClusterId::from("ghost"),
                ProxyConfigRequest {
                    request_id: "r1".to_string(),
                    namespace: "default".to_string(),
                    pod_name: "pod-a".to_string(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, NavError::NotFound(_)));
    }

    #[tokio::test]
    async fn disconnect_cancels_the_stream() {
        let manager = Arc::new(ConnectionManager::new());
        let (tx, mut rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        let m2 = manager.clone();
        let c2 = cancel.clone();
        let handle = tokio::spawn(async move {
            m2.serve_stream(stream::iter(vec![identify("c1")]), tx, c2).await
        });
        let _ = rx.recv().await;

        manager.disconnect(&ClusterId::from("c1")).unwrap();
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(NavError::Disconnected(_))));
    }
}
