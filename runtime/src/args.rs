//! CLI configuration (spec.md §8 / SPEC_FULL.md §8), mirroring the
//! teacher's flattened, `env`-fallback `Args` shape.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

#[derive(Debug, Parser)]
#[clap(name = "navigator", about = "Multi-cluster service-mesh observability hub")]
pub struct Args {
    #[clap(long, default_value = "info", env = "NAVIGATOR_LOG")]
    pub log_level: String,

    #[clap(long, value_enum, default_value = "plain", env = "NAVIGATOR_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Listen address for the `Connect` stream and Frontend RPCs.
    #[clap(long, default_value = "0.0.0.0:8443", env = "NAVIGATOR_GRPC_ADDR")]
    pub grpc_addr: SocketAddr,

    /// Listen address for `/ready` and Prometheus `/metrics`.
    #[clap(long, default_value = "0.0.0.0:9990", env = "NAVIGATOR_ADMIN_ADDR")]
    pub admin_addr: SocketAddr,

    /// How long a `GetProxyConfig` call waits for its edge's response
    /// before failing with `NavError::Timeout` (spec.md §4.E).
    #[clap(long, default_value = "30", env = "NAVIGATOR_PROXY_CONFIG_TIMEOUT_SECS")]
    pub proxy_config_timeout_secs: u64,

    /// How often the proxy-config broker sweeps for abandoned requests.
    #[clap(long, default_value = "60", env = "NAVIGATOR_BROKER_GC_INTERVAL_SECS")]
    pub broker_gc_interval_secs: u64,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> anyhow::Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> anyhow::Result<()> {
        crate::run(self).await
    }
}
