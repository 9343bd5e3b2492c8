//! AWS-oriented adapters and handlers for the image optimizer Lambda.
//!
//! This crate owns runtime integration details (Lambda handler, S3 and HTTP
//! downloads) and delegates decoding, resizing and response shaping to
//! `imaginex_core`.

pub mod adapters;
pub mod handlers;
