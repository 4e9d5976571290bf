#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Wires the Manager's components together: the Connection Manager, the
//! proxy-config broker, the Istio query service, the Frontend query
//! service, and the ambient admin/logging stack (SPEC_FULL.md §8).

mod admin;
mod args;

pub use args::{Args, LogFormat};

use navigator_grpc::frontend::Frontend;
use navigator_grpc::istio::IstioQueryService;
use navigator_hub::{ClusterRouter, ConnectionManager, ProxyConfigBroker};
use navigator_policy::metrics::FilterMetrics;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// The Manager's fully-wired component graph, handed to whatever
/// transport layer adopts `navigator_grpc::{ConnectService, FrontendService}`
/// (spec.md §6: that transport is a `tonic_build`-generated drop-in not
/// built in this exercise).
pub struct Manager {
    pub connection_manager: Arc<ConnectionManager>,
    pub broker: Arc<ProxyConfigBroker>,
    pub frontend: Arc<Frontend>,
}

fn init_tracing(log_level: &str, log_format: LogFormat) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match log_format {
        LogFormat::Plain => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }
}

/// Builds the component graph without starting any background tasks or
/// servers; split out from [`run`] so tests and alternate transports can
/// construct a `Manager` without the admin HTTP server and signal loop.
pub fn build(args: &Args, registry: &mut Registry) -> Manager {
    let connection_manager = Arc::new(ConnectionManager::new());
    let router: Arc<dyn ClusterRouter> = connection_manager.clone();
    let broker = Arc::new(ProxyConfigBroker::with_timeout(
        Arc::downgrade(&router),
        Duration::from_secs(args.proxy_config_timeout_secs),
    ));
    connection_manager.bind_response_sink(broker.clone());

    let filter_metrics = Arc::new(FilterMetrics::register(registry));
    let istio = IstioQueryService::new(connection_manager.clone(), Some(filter_metrics));
    let frontend = Arc::new(Frontend::new(connection_manager.clone(), broker.clone(), istio));

    Manager {
        connection_manager,
        broker,
        frontend,
    }
}

pub async fn run(args: Args) -> anyhow::Result<()> {
    init_tracing(&args.log_level, args.log_format);

    let mut registry = <Registry>::default();
    let manager = build(&args, &mut registry);
    let registry = Arc::new(registry);

    let gc = {
        let broker = manager.broker.clone();
        let interval = Duration::from_secs(args.broker_gc_interval_secs);
        tokio::spawn(async move { broker.run_gc(interval).await })
    };

    let (ready_tx, ready_rx) = tokio::sync::watch::channel(true);
    let admin_addr = args.admin_addr;
    let admin = tokio::spawn(admin::serve(admin_addr, ready_rx, registry));

    tracing::info!(
        grpc_addr = %args.grpc_addr,
        admin_addr = %admin_addr,
        "navigator manager started"
    );

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received shutdown signal");
        }
        res = admin => {
            res??;
        }
    }

    let _ = ready_tx.send(false);
    gc.abort();
    Ok(())
}
