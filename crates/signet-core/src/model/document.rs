use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DocumentBody, Signature};
use crate::errors::{Result, SignetError};

/// Hydration slot for a related collection
///
/// Distinguishes "not requested" from "requested and empty" so that a caller
/// who forgot to ask for a relation gets an error rather than a silently
/// empty value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Attached<T> {
    #[default]
    NotLoaded,
    Loaded(T),
}

impl<T> Attached<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Attached::Loaded(_))
    }

    pub fn as_loaded(&self) -> Option<&T> {
        match self {
            Attached::Loaded(value) => Some(value),
            Attached::NotLoaded => None,
        }
    }
}

/// Document - a signable legal document
///
/// `version` is bumped by the write path on every content edit and is the
/// only source of truth for which signatures still count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Numeric row id; the sort and paging key
    pub id: i64,

    /// Stable object identifier used by relations and signatures
    pub phid: String,

    pub title: String,

    /// Owner (author) of the document
    pub creator_phid: String,

    /// Reference to the current body row
    pub body_phid: String,

    /// Current content version
    pub version: u32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    body: Attached<Option<DocumentBody>>,
    contributors: Attached<Vec<String>>,
    signatures: Attached<Vec<Signature>>,
}

impl Document {
    /// Create an unhydrated document at version 1 with current timestamps
    pub fn new(id: i64, phid: String, creator_phid: String, body_phid: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            phid,
            title: String::new(),
            creator_phid,
            body_phid,
            version: 1,
            created_at: now,
            updated_at: now,
            body: Attached::NotLoaded,
            contributors: Attached::NotLoaded,
            signatures: Attached::NotLoaded,
        }
    }

    /// Attach the resolved body; `None` records an unresolvable reference
    pub fn attach_body(&mut self, body: Option<DocumentBody>) {
        self.body = Attached::Loaded(body);
    }

    pub fn attach_contributors(&mut self, contributors: Vec<String>) {
        self.contributors = Attached::Loaded(contributors);
    }

    /// Attach the signature set; callers attach only signatures valid for
    /// the current version
    pub fn attach_signatures(&mut self, signatures: Vec<Signature>) {
        self.signatures = Attached::Loaded(signatures);
    }

    /// The attached body, or `Ok(None)` if its reference did not resolve
    ///
    /// # Errors
    ///
    /// `AttachmentNotLoaded` if bodies were not requested.
    pub fn body(&self) -> Result<Option<&DocumentBody>> {
        match &self.body {
            Attached::Loaded(body) => Ok(body.as_ref()),
            Attached::NotLoaded => Err(self.not_loaded("body")),
        }
    }

    /// # Errors
    ///
    /// `AttachmentNotLoaded` if contributors were not requested.
    pub fn contributors(&self) -> Result<&[String]> {
        match &self.contributors {
            Attached::Loaded(contributors) => Ok(contributors),
            Attached::NotLoaded => Err(self.not_loaded("contributors")),
        }
    }

    /// # Errors
    ///
    /// `AttachmentNotLoaded` if signatures were not requested.
    pub fn signatures(&self) -> Result<&[Signature]> {
        match &self.signatures {
            Attached::Loaded(signatures) => Ok(signatures),
            Attached::NotLoaded => Err(self.not_loaded("signatures")),
        }
    }

    pub fn has_body_attached(&self) -> bool {
        self.body.is_loaded()
    }

    pub fn has_contributors_attached(&self) -> bool {
        self.contributors.is_loaded()
    }

    pub fn has_signatures_attached(&self) -> bool {
        self.signatures.is_loaded()
    }

    fn not_loaded(&self, attachment: &'static str) -> SignetError {
        SignetError::AttachmentNotLoaded {
            document_phid: self.phid.clone(),
            attachment,
        }
    }
}
