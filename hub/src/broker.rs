//! The proxy-config broker (spec.md §4.E): correlates in-flight
//! `GetProxyConfig` calls with the edge's asynchronous response.
//!
//! The `requestId -> PendingProxyRequest` map is guarded by a dedicated
//! `parking_lot::Mutex` rather than an `RwLock` — both insert and remove
//! are writes, and nothing reads the map independent of a mutation
//! (spec.md §5). Completion is a `tokio::sync::oneshot`, the same one-shot
//! rendezvous primitive the design notes call for (spec.md §9,
//! "coroutine control flow").

use crate::manager::{ClusterRouter, ProxyConfigResponseSink};
use navigator_core::wire::{ProxyConfigRequest, ProxyConfigResponse};
use navigator_core::{ClusterId, NavError};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A proxy-config result: raw config bytes plus the version the edge
/// reported alongside them (spec.md §4.E).
pub type ProxyConfigResult = (Vec<u8>, String);

struct PendingEntry {
    cluster_id: ClusterId,
    submitted_at: Instant,
    completion: oneshot::Sender<Result<ProxyConfigResult, NavError>>,
}

pub struct ProxyConfigBroker {
    pending: parking_lot::Mutex<ahash::AHashMap<String, PendingEntry>>,
    router: Weak<dyn ClusterRouter>,
    timeout: Duration,
}

impl ProxyConfigBroker {
    pub fn new(router: Weak<dyn ClusterRouter>) -> Self {
        Self::with_timeout(router, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(router: Weak<dyn ClusterRouter>, timeout: Duration) -> Self {
        Self {
            pending: parking_lot::Mutex::new(ahash::AHashMap::new()),
            router,
            timeout,
        }
    }

    /// Issues a proxy-config request to `cluster_id` and awaits its
    /// response, a default timeout, or the caller's own cancellation.
    #[instrument(skip(self))]
    pub async fn get_proxy_config(
        &self,
        cluster_id: &ClusterId,
        namespace: &str,
        pod_name: &str,
    ) -> Result<ProxyConfigResult, NavError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock();
            pending.insert(
                request_id.clone(),
                PendingEntry {
                    cluster_id: cluster_id.clone(),
                    submitted_at: Instant::now(),
                    completion: tx,
                },
            );
        }

        let router = self
            .router
            .upgrade()
            .ok_or_else(|| NavError::Internal("connection manager no longer available".to_string()))?;
        if let Err(e) = router.send_to_cluster(
            cluster_id,
            ProxyConfigRequest {
                request_id: request_id.clone(),
                namespace: namespace.to_string(),
                pod_name: pod_name.to_string(),
            },
        ) {
            self.pending.lock().remove(&request_id);
            return Err(e);
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => {
                self.pending.lock().remove(&request_id);
                Err(NavError::Disconnected(format!(
                    "cluster {cluster_id} disconnected while awaiting proxy config"
                )))
            }
            Err(_) => {
                self.pending.lock().remove(&request_id);
                Err(NavError::Timeout(format!(
                    "proxy-config request to {cluster_id} timed out after {:?}",
                    self.timeout
                )))
            }
        }
    }

    /// Background sweep removing any entry that outlived the timeout —
    /// bounds memory under an edge that never responds and never
    /// disconnects cleanly (spec.md §4.E).
    pub async fn run_gc(self: &Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            self.sweep_expired();
        }
    }

    fn sweep_expired(&self) {
        let now = Instant::now();
        let mut pending = self.pending.lock();
        let expired: Vec<String> = pending
            .iter()
            .filter(|(_, e)| now.duration_since(e.submitted_at) >= self.timeout)
            .map(|(id, _)| id.clone())
            .collect();
        for id in expired {
            if let Some(entry) = pending.remove(&id) {
                warn!(request_id = %id, cluster_id = %entry.cluster_id, "garbage-collected abandoned proxy-config request");
            }
        }
    }
}

impl ProxyConfigResponseSink for ProxyConfigBroker {
    fn complete(&self, response: ProxyConfigResponse) {
        let entry = self.pending.lock().remove(&response.request_id);
        let Some(entry) = entry else {
            debug!(request_id = %response.request_id, "proxy-config response for unknown or expired request");
            return;
        };
        let result = match response.error_message {
            Some(msg) => Err(NavError::Internal(msg)),
            None => Ok((response.proxy_config, response.version)),
        };
        let _ = entry.completion.send(result);
    }

    fn fail_cluster(&self, cluster_id: &ClusterId) {
        let mut pending = self.pending.lock();
        let ids: Vec<String> = pending
            .iter()
            .filter(|(_, e)| &e.cluster_id == cluster_id)
            .map(|(id, _)| id.clone())
            .collect();
        for id in ids {
            if let Some(entry) = pending.remove(&id) {
                let _ = entry.completion.send(Err(NavError::Disconnected(format!(
                    "cluster {cluster_id} disconnected"
                ))));
            }
        }
    }
}
