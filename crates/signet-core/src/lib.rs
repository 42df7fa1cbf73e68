//! Signet Core - pure kernel of the document query stack
//!
//! This crate holds everything about a document query that does not touch
//! I/O:
//! - Document, body, signature and relation models
//! - Typed predicates and their conjunction
//! - Seek-based Pager/Cursor
//! - Version reconciliation of signatures
//! - Visibility policy and storage collaborator traits
//! - Error and logging facilities, query configuration

pub mod config;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod pager;
pub mod policy;
pub mod predicate;
pub mod reconcile;
pub mod storage;

// Used by the exported logging macros
#[doc(hidden)]
pub use signet_core_types;

// Re-export commonly used types
pub use config::QueryConfig;
pub use errors::{ExError, ExErrorKind, Result, SignetError};
pub use model::{Document, DocumentBody, Relation, RelationKind, Signature};
pub use pager::{Cursor, Page, PageRequest, Pager, PagerState, SortOrder};
pub use policy::{AllowAllPolicy, VisibilityPolicy};
pub use predicate::{DocumentFilter, Predicate};
pub use storage::{DocumentStorage, RelationStore, StorageResult};
