//! Core types shared across Signet crates
//!
//! This crate provides foundational types used by the error and logging
//! facilities of the document query stack:
//!
//! - **Correlation types**: RequestId, TraceId, RequestContext
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId, TraceId};
