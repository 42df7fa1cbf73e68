use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// DocumentBody - the content payload of one document version
///
/// A document points at exactly one body at a time through `body_phid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentBody {
    pub phid: String,

    /// Owning document
    pub document_phid: String,

    /// Document version this body was written for
    pub version: u32,

    pub title: String,
    pub text: String,

    /// Author of this revision
    pub creator_phid: String,

    pub created_at: DateTime<Utc>,
}
