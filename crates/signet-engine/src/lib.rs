//! Signet Engine - document query orchestration
//!
//! Coordinates one paged read: fetch through the storage traits, apply the
//! visibility policy, reconcile signatures against document versions, and
//! hydrate the requested relations in batches.

pub mod deadline;
pub mod hydrate;
pub mod query;

pub use deadline::{CancelToken, Deadline};
pub use hydrate::{Hydrator, Needs, SignatureIndex};
pub use query::{DocumentPage, DocumentQuery};

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, signet_core::errors::ExError>;
