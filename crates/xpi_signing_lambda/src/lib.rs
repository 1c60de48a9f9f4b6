//! AWS-oriented adapters and the handler for XPI upload notifications.
//!
//! This crate owns runtime integration details (the Lambda handler, the
//! object store seam, scratch buffers, and configuration). Contract parsing
//! and archive inspection live in `xpi_signing_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod scratch;
