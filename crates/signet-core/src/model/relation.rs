use serde::{Deserialize, Serialize};

use crate::errors::{Result, SignetError};

/// Kind tag of a directed relation between two objects
///
/// Persisted as a stable integer code; codes must never be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelationKind {
    /// document → user who contributed to it
    HasContributor,
    /// user → document they contributed to
    ContributedTo,
}

impl RelationKind {
    pub fn code(&self) -> i64 {
        match self {
            RelationKind::HasContributor => 33,
            RelationKind::ContributedTo => 34,
        }
    }

    /// # Errors
    ///
    /// `UnknownRelationKind` for codes with no variant.
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            33 => Ok(RelationKind::HasContributor),
            34 => Ok(RelationKind::ContributedTo),
            other => Err(SignetError::UnknownRelationKind { code: other }),
        }
    }

    /// The kind of the edge written in the opposite direction
    pub fn inverse(&self) -> Self {
        match self {
            RelationKind::HasContributor => RelationKind::ContributedTo,
            RelationKind::ContributedTo => RelationKind::HasContributor,
        }
    }
}

/// A directed edge `src -[kind]-> dst`
///
/// `(src, kind, dst)` is unique in storage; `seq` records insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub src: String,
    pub kind: RelationKind,
    pub dst: String,
    pub seq: i64,
}
