#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Resource filters — component A of the Navigator Manager (spec.md
//! §4.A): pure, side-effect-free functions deciding whether an Istio
//! configuration resource applies to a given workload instance.
//!
//! Each filter module mirrors the granularity of
//! `linkerd-policy-controller-k8s-index`'s per-resource-type modules
//! (`server.rs`, `authz.rs`, `server_authorization.rs`): one file per
//! Istio resource kind, unit-tested independently.

mod common;
mod destination_rule;
mod gateway;
mod scoped;
mod service_entry;
mod sidecar;
mod virtual_service;

pub mod metrics;
mod resolve;

pub use common::{derive_gateway_names, is_visible_to_namespace, selector_matches};
pub use resolve::resolve_for_workload;
