#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod status;
pub mod wire;

pub mod frontend;
pub mod istio;
pub mod service;

pub use service::{ConnectService, FrontendService};
pub use status::to_status;
