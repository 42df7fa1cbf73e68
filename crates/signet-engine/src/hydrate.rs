//! Relation hydration
//!
//! Fills the attachment slots of a page of documents. Each requested
//! relation costs exactly one batched storage call keyed by the whole page,
//! so a page of a thousand documents costs the same number of round trips
//! as a page of one.

use std::collections::{BTreeSet, HashMap, HashSet};

use signet_core::model::{Document, RelationKind, Signature};
use signet_core::reconcile::reconcile;
use signet_core::storage::{DocumentStorage, RelationStore};

use crate::deadline::Deadline;
use crate::Result;

/// Signatures of a page, keyed by document phid
pub type SignatureIndex = HashMap<String, Vec<Signature>>;

/// Which attachment slots to fill
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Needs {
    pub body: bool,
    pub contributors: bool,
    pub signatures: bool,
}

impl Needs {
    pub fn all() -> Self {
        Self {
            body: true,
            contributors: true,
            signatures: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.body || self.contributors || self.signatures)
    }
}

pub struct Hydrator<'a> {
    documents: &'a dyn DocumentStorage,
    relations: &'a dyn RelationStore,
}

impl<'a> Hydrator<'a> {
    pub fn new(documents: &'a dyn DocumentStorage, relations: &'a dyn RelationStore) -> Self {
        Self {
            documents,
            relations,
        }
    }

    /// Fill the slots named by `needs`
    ///
    /// `preloaded` lets a caller that already fetched the page's signatures
    /// (to evaluate a signer filter) reuse them instead of querying again.
    /// The deadline is checked before every storage call.
    ///
    /// # Errors
    ///
    /// The first storage error or `Timeout`; no document is returned
    /// partially hydrated.
    pub fn hydrate(
        &self,
        mut documents: Vec<Document>,
        needs: Needs,
        preloaded: Option<SignatureIndex>,
        deadline: &Deadline,
    ) -> Result<Vec<Document>> {
        if documents.is_empty() || needs.is_empty() {
            return Ok(documents);
        }

        if needs.body {
            deadline.check("load_bodies")?;
            self.attach_bodies(&mut documents)?;
        }

        if needs.contributors {
            deadline.check("load_contributors")?;
            self.attach_contributors(&mut documents)?;
        }

        if needs.signatures {
            let index = match preloaded {
                Some(index) => index,
                None => {
                    deadline.check("load_signatures")?;
                    self.load_signature_index(&documents)?
                }
            };
            attach_signatures(&mut documents, &index);
        }

        Ok(documents)
    }

    /// Every signature of `documents`, all versions, in one query
    ///
    /// # Errors
    ///
    /// Storage errors from `load_signatures`.
    pub fn load_signature_index(&self, documents: &[Document]) -> Result<SignatureIndex> {
        let phids = distinct(documents.iter().map(|d| d.phid.as_str()));
        if phids.is_empty() {
            return Ok(SignatureIndex::new());
        }
        let signatures = self.documents.load_signatures(&phids)?;
        tracing::debug!(relation = "signatures", rows = signatures.len(), "hydrated");

        let mut index = SignatureIndex::new();
        for signature in signatures {
            index
                .entry(signature.document_phid.clone())
                .or_default()
                .push(signature);
        }
        Ok(index)
    }

    /// # Errors
    ///
    /// Storage errors from `load_bodies`.
    pub fn attach_bodies(&self, documents: &mut [Document]) -> Result<()> {
        let phids = distinct(documents.iter().map(|d| d.body_phid.as_str()));
        let bodies = if phids.is_empty() {
            Vec::new()
        } else {
            self.documents.load_bodies(&phids)?
        };
        tracing::debug!(relation = "bodies", rows = bodies.len(), "hydrated");

        let by_phid: HashMap<String, _> = bodies
            .into_iter()
            .map(|body| (body.phid.clone(), body))
            .collect();
        for document in documents.iter_mut() {
            // Two documents may share a body reference
            let body = by_phid.get(&document.body_phid).cloned();
            document.attach_body(body);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Storage errors from `list_by_sources`.
    pub fn attach_contributors(&self, documents: &mut [Document]) -> Result<()> {
        let phids = distinct(documents.iter().map(|d| d.phid.as_str()));
        let edges = if phids.is_empty() {
            Vec::new()
        } else {
            self.relations
                .list_by_sources(&phids, RelationKind::HasContributor)?
        };
        tracing::debug!(relation = "contributors", rows = edges.len(), "hydrated");

        let mut seen: HashSet<(String, String)> = HashSet::with_capacity(edges.len());
        let mut by_document: HashMap<String, Vec<String>> = HashMap::new();
        for edge in edges {
            if seen.insert((edge.src.clone(), edge.dst.clone())) {
                by_document.entry(edge.src).or_default().push(edge.dst);
            }
        }
        for document in documents.iter_mut() {
            let contributors = by_document.get(&document.phid).cloned().unwrap_or_default();
            document.attach_contributors(contributors);
        }
        Ok(())
    }
}

/// Attach each document's signatures that are valid for its current version
pub fn attach_signatures(documents: &mut [Document], index: &SignatureIndex) {
    for document in documents.iter_mut() {
        let signatures = index.get(&document.phid).cloned().unwrap_or_default();
        let reconciled = reconcile(document.version, signatures);
        if !reconciled.stale.is_empty() {
            tracing::debug!(
                document = %document.phid,
                stale = reconciled.stale.len(),
                "excluded stale signatures"
            );
        }
        document.attach_signatures(reconciled.valid);
    }
}

fn distinct<'s>(keys: impl Iterator<Item = &'s str>) -> Vec<String> {
    keys.collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
