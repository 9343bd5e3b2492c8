//! Image optimization domain primitives.
//!
//! This crate owns request validation, source classification, format
//! detection, resizing/re-encoding and the API Gateway response contract.
//! It intentionally excludes AWS SDK and Lambda runtime concerns.

pub mod config;
pub mod error;
pub mod format;
pub mod optimize;
pub mod request;
pub mod response;
pub mod source;
