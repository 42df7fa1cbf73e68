use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Signature - one signer's acceptance of one document version
///
/// Signatures form an append-only log. Editing a document does not delete
/// earlier signatures; they simply stop matching the document's version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub id: i64,

    /// Signed document
    pub document_phid: String,

    pub signer_phid: String,

    /// Version of the document content that was actually signed
    pub document_version: u32,

    /// Free-form payload captured at signing time (name, email, ...)
    pub signature_data: serde_json::Value,

    pub created_at: DateTime<Utc>,
}

impl Signature {
    /// Whether this signature applies to the given document version
    pub fn is_valid_for(&self, document_version: u32) -> bool {
        self.document_version == document_version
    }

    pub fn signer_name(&self) -> Option<&str> {
        self.signature_data.get("name").and_then(|v| v.as_str())
    }

    pub fn signer_email(&self) -> Option<&str> {
        self.signature_data.get("email").and_then(|v| v.as_str())
    }
}
