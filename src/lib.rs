#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use navigator_runtime as runtime;
