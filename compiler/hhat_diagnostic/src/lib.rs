//! Diagnostics for the H-hat execution core: error codes and the
//! structured error value returned by every fallible core operation.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod error;
mod error_code;

pub use error::{AssignFailure, CoreError, CoreErrorKind, CoreResult};
pub use error_code::ErrorCode;
