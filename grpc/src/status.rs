//! `NavError` -> `tonic::Status` (spec.md §7): this is the only place in
//! the Manager that performs that translation, matching the teacher's
//! split of core error types from wire-level status mapping.

use navigator_core::NavError;
use tonic::{Code, Status};

pub fn to_status(err: NavError) -> Status {
    let code = match &err {
        NavError::InvalidArgument(_) => Code::InvalidArgument,
        NavError::NotFound(_) => Code::NotFound,
        NavError::AlreadyExists(_) => Code::AlreadyExists,
        NavError::Timeout(_) => Code::DeadlineExceeded,
        NavError::Disconnected(_) => Code::Unavailable,
        NavError::Internal(_) => Code::Internal,
    };
    Status::new(code, err.to_string())
}
