//! Version reconciliation of signatures
//!
//! A signature only counts while the version it recorded equals the
//! document's current version. Nothing here mutates or deletes signatures:
//! stale ones are simply left out of the attached view.

use std::collections::{BTreeSet, HashMap};

use crate::model::{Document, Signature};

/// A document's signatures split by whether they match its version
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciled {
    pub valid: Vec<Signature>,
    pub stale: Vec<Signature>,
}

impl Reconciled {
    /// Distinct signers among the valid signatures
    pub fn valid_signers(&self) -> BTreeSet<String> {
        self.valid.iter().map(|s| s.signer_phid.clone()).collect()
    }
}

/// Partition signatures into valid and stale for `document_version`
///
/// Input order is preserved within each partition.
pub fn reconcile(document_version: u32, signatures: Vec<Signature>) -> Reconciled {
    let (valid, stale) = signatures
        .into_iter()
        .partition(|sig| sig.is_valid_for(document_version));
    Reconciled { valid, stale }
}

/// Distinct signer ids whose signature matches `document_version`
pub fn valid_signers(document_version: u32, signatures: &[Signature]) -> BTreeSet<String> {
    signatures
        .iter()
        .filter(|sig| sig.is_valid_for(document_version))
        .map(|sig| sig.signer_phid.clone())
        .collect()
}

/// `required - valid`
pub fn missing_signers(required: &BTreeSet<String>, valid: &BTreeSet<String>) -> BTreeSet<String> {
    required.difference(valid).cloned().collect()
}

/// Whether every required signer has a valid signature
pub fn satisfies(required: &BTreeSet<String>, valid: &BTreeSet<String>) -> bool {
    required.is_subset(valid)
}

/// Keep only documents whose valid-signer set covers `required`
///
/// `signatures_by_document` is keyed by document phid; documents with no
/// entry have no signatures. Returns a new collection in input order. An
/// empty `required` set keeps everything.
pub fn retain_fully_signed(
    documents: Vec<Document>,
    signatures_by_document: &HashMap<String, Vec<Signature>>,
    required: &BTreeSet<String>,
) -> Vec<Document> {
    if required.is_empty() {
        return documents;
    }
    documents
        .into_iter()
        .filter(|doc| {
            let signatures = signatures_by_document
                .get(&doc.phid)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let valid = valid_signers(doc.version, signatures);
            let missing = missing_signers(required, &valid);
            if !missing.is_empty() {
                tracing::debug!(
                    document = %doc.phid,
                    version = doc.version,
                    missing = missing.len(),
                    "dropping document with incomplete signer set"
                );
            }
            missing.is_empty()
        })
        .collect()
}
