//! Shared XPI signing domain primitives.
//!
//! This crate owns the upload notification contract, the per-record checks,
//! and archive inspection. It intentionally excludes AWS SDK and Lambda
//! runtime concerns.

pub mod contract;
pub mod digest;
pub mod manifest;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
