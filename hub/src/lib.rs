#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! The Connection Manager, the aggregated index it publishes, and the
//! proxy-config broker it routes through — components C, D and E of the
//! Navigator Manager.

pub mod broker;
pub mod index;
pub mod manager;

pub use broker::ProxyConfigBroker;
pub use index::AggregatedIndex;
pub use manager::{ClusterRouter, ConnectionManager, ProxyConfigResponseSink};
