//! Storage collaborator traits
//!
//! The query engine talks to persistence only through these traits. Each
//! method is one round trip; implementations must not fan a batched call
//! out into per-document queries.

use crate::errors::ExError;
use crate::model::{Document, DocumentBody, Relation, RelationKind, Signature};
use crate::pager::PageRequest;

/// Result type for storage calls
pub type StorageResult<T> = std::result::Result<T, ExError>;

/// Access to the document, body and signature tables
pub trait DocumentStorage {
    /// Fetch up to `request.fetch_limit()` documents matching the filter,
    /// past the cursor, in the requested order. Attachments are left
    /// unloaded.
    fn fetch_documents(&self, request: &PageRequest) -> StorageResult<Vec<Document>>;

    /// Bodies whose phid is in `body_phids`; unknown phids are skipped
    fn load_bodies(&self, body_phids: &[String]) -> StorageResult<Vec<DocumentBody>>;

    /// Every signature of the given documents, all versions included
    fn load_signatures(&self, document_phids: &[String]) -> StorageResult<Vec<Signature>>;
}

/// Access to typed directed edges
pub trait RelationStore {
    /// Edges of `kind` leaving any of `sources`, ordered by source then `seq`
    fn list_by_sources(
        &self,
        sources: &[String],
        kind: RelationKind,
    ) -> StorageResult<Vec<Relation>>;

    /// Edges of `kind` arriving at any of `destinations`, ordered by
    /// destination then `seq`
    fn list_by_destinations(
        &self,
        destinations: &[String],
        kind: RelationKind,
    ) -> StorageResult<Vec<Relation>>;
}
