//! Istio configuration resource types, as reported by an edge (spec.md
//! §3, §4.A). These are plain data — the filtering rules that consume
//! them live in `navigator-policy`.

use ahash::AHashMap as HashMap;

/// A label selector, simplified to the spec's semantics: empty/absent
/// matches everything, otherwise every key must be present in the target
/// labels with an equal value (spec.md §4.A, "Label-selector match").
pub type Selector = HashMap<String, String>;

/// A reference to another resource that a policy resource applies to
/// (spec.md §4.A, "TargetRef matching"). `group` is empty for the core
/// API group (e.g. `Service`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetRef {
    pub group: String,
    pub kind: String,
    pub name: String,
    /// `None` means "same namespace as the referencing resource", which
    /// is the only case target-ref matching resolves (spec.md §9).
    pub namespace: Option<String>,
}

/// Capability shared by the resources whose visibility is governed by
/// `exportTo` (spec.md §4.A): `VirtualService`, `DestinationRule`,
/// `ServiceEntry`. Kept as a trait rather than a common base struct so
/// each resource can carry its own additional fields without an
/// inheritance hierarchy (spec.md §9, design note on polymorphic
/// resources).
pub trait Exporter {
    fn namespace(&self) -> &str;
    fn export_to(&self) -> &[String];
}

/// Capability shared by resources identified by `namespace/name`, used to
/// key the gateway-driven `VirtualService` merge and general
/// deduplication (spec.md §4.A, §4.G).
pub trait NamedResource {
    fn name(&self) -> &str;
    fn namespace(&self) -> &str;

    fn key(&self) -> String {
        format!("{}/{}", self.namespace(), self.name())
    }
}

macro_rules! impl_named {
    ($ty:ty) => {
        impl NamedResource for $ty {
            fn name(&self) -> &str {
                &self.name
            }
            fn namespace(&self) -> &str {
                &self.namespace
            }
        }
    };
}

macro_rules! impl_exporter {
    ($ty:ty) => {
        impl Exporter for $ty {
            fn namespace(&self) -> &str {
                &self.namespace
            }
            fn export_to(&self) -> &[String] {
                &self.export_to
            }
        }
    };
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct VirtualService {
    pub name: String,
    pub namespace: String,
    pub export_to: Vec<String>,
    /// Defaults to `["mesh"]` when empty (spec.md §4.A).
    pub gateways: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct DestinationRule {
    pub name: String,
    pub namespace: String,
    pub export_to: Vec<String>,
    /// Empty/nil matches all workloads (spec.md §4.A). Host-based
    /// filtering is reserved but unenforced per the spec, so there is no
    /// `host` field consulted by filtering.
    pub selector: Selector,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ServiceEntry {
    pub name: String,
    pub namespace: String,
    pub export_to: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Gateway {
    pub name: String,
    pub namespace: String,
    pub selector: Selector,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Sidecar {
    pub name: String,
    pub namespace: String,
    pub selector: Selector,
}

/// Shared shape for the five resources governed by the root-namespace /
/// target-ref / selector cascade (spec.md §4.A): `EnvoyFilter`,
/// `RequestAuthentication`, `AuthorizationPolicy`, `PeerAuthentication`,
/// `WasmPlugin`. `selector` is `None` to distinguish "absent" from
/// "present and empty" only where the spec's rule cares (PeerAuthentication);
/// for the others an empty map plays the same role.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct PolicyScopedResource {
    pub name: String,
    pub namespace: String,
    pub selector: Option<Selector>,
    pub target_refs: Vec<TargetRef>,
}

impl_named!(VirtualService);
impl_named!(DestinationRule);
impl_named!(ServiceEntry);
impl_named!(Gateway);
impl_named!(Sidecar);
impl_named!(PolicyScopedResource);

impl_exporter!(VirtualService);
impl_exporter!(DestinationRule);
impl_exporter!(ServiceEntry);

pub type EnvoyFilter = PolicyScopedResource;
pub type RequestAuthentication = PolicyScopedResource;
pub type AuthorizationPolicy = PolicyScopedResource;
pub type PeerAuthentication = PolicyScopedResource;
pub type WasmPlugin = PolicyScopedResource;

/// The full set of Istio configuration resources reported by one cluster
/// (spec.md §3).
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct IstioResources {
    pub virtual_services: Vec<VirtualService>,
    pub destination_rules: Vec<DestinationRule>,
    pub gateways: Vec<Gateway>,
    pub sidecars: Vec<Sidecar>,
    pub envoy_filters: Vec<EnvoyFilter>,
    pub request_authentications: Vec<RequestAuthentication>,
    pub peer_authentications: Vec<PeerAuthentication>,
    pub authorization_policies: Vec<AuthorizationPolicy>,
    pub wasm_plugins: Vec<WasmPlugin>,
    pub service_entries: Vec<ServiceEntry>,
}

/// The composite result of applying every filter in `navigator-policy`
/// for one workload instance (spec.md §4.A, §4.G).
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FilteredIstioResources {
    pub virtual_services: Vec<VirtualService>,
    pub destination_rules: Vec<DestinationRule>,
    pub gateways: Vec<Gateway>,
    pub sidecars: Vec<Sidecar>,
    pub envoy_filters: Vec<EnvoyFilter>,
    pub request_authentications: Vec<RequestAuthentication>,
    pub peer_authentications: Vec<PeerAuthentication>,
    pub authorization_policies: Vec<AuthorizationPolicy>,
    pub wasm_plugins: Vec<WasmPlugin>,
    pub service_entries: Vec<ServiceEntry>,
}
