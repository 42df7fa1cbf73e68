//! Row → model conversion
//!
//! Closures passed to `query_map` may only fail with `rusqlite::Error`, so
//! values that need domain validation (signature JSON, relation kind codes)
//! are read into raw rows first and converted afterwards.

#![allow(clippy::result_large_err)]

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;
use signet_core::errors::ExError;
use signet_core::model::{Document, DocumentBody, Relation, RelationKind, Signature};

use crate::errors::{corrupt_row, Result};

fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let secs: i64 = row.get(idx)?;
    DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("timestamp {} out of range", secs).into(),
        )
    })
}

/// Expects the column order of `predicate_sql::DOCUMENT_COLUMNS`
pub(crate) fn row_to_document(row: &Row<'_>) -> rusqlite::Result<Document> {
    let mut document = Document::new(row.get(0)?, row.get(1)?, row.get(3)?, row.get(4)?);
    document.title = row.get(2)?;
    document.version = row.get(5)?;
    document.created_at = timestamp_at(row, 6)?;
    document.updated_at = timestamp_at(row, 7)?;
    Ok(document)
}

pub(crate) const BODY_COLUMNS: &str =
    "phid, document_phid, version, title, text, creator_phid, created_at";

pub(crate) fn row_to_body(row: &Row<'_>) -> rusqlite::Result<DocumentBody> {
    Ok(DocumentBody {
        phid: row.get(0)?,
        document_phid: row.get(1)?,
        version: row.get(2)?,
        title: row.get(3)?,
        text: row.get(4)?,
        creator_phid: row.get(5)?,
        created_at: timestamp_at(row, 6)?,
    })
}

pub(crate) const SIGNATURE_COLUMNS: &str =
    "id, document_phid, signer_phid, document_version, signature_data, created_at";

/// A signature whose JSON payload has not been parsed yet
pub(crate) struct SignatureRow {
    id: i64,
    document_phid: String,
    signer_phid: String,
    document_version: u32,
    signature_data: String,
    created_at: DateTime<Utc>,
}

pub(crate) fn row_to_signature(row: &Row<'_>) -> rusqlite::Result<SignatureRow> {
    Ok(SignatureRow {
        id: row.get(0)?,
        document_phid: row.get(1)?,
        signer_phid: row.get(2)?,
        document_version: row.get(3)?,
        signature_data: row.get(4)?,
        created_at: timestamp_at(row, 5)?,
    })
}

impl SignatureRow {
    pub(crate) fn into_signature(self) -> Result<Signature> {
        let signature_data = serde_json::from_str(&self.signature_data).map_err(|e| {
            corrupt_row("signatures", self.id.to_string(), &e.to_string())
        })?;
        Ok(Signature {
            id: self.id,
            document_phid: self.document_phid,
            signer_phid: self.signer_phid,
            document_version: self.document_version,
            signature_data,
            created_at: self.created_at,
        })
    }
}

pub(crate) const RELATION_COLUMNS: &str = "src, kind, dst, seq";

pub(crate) struct RelationRow {
    src: String,
    kind: i64,
    dst: String,
    seq: i64,
}

pub(crate) fn row_to_relation(row: &Row<'_>) -> rusqlite::Result<RelationRow> {
    Ok(RelationRow {
        src: row.get(0)?,
        kind: row.get(1)?,
        dst: row.get(2)?,
        seq: row.get(3)?,
    })
}

impl RelationRow {
    pub(crate) fn into_relation(self) -> Result<Relation> {
        let kind = RelationKind::from_code(self.kind)
            .map_err(|e| ExError::from(e).with_entity_id(format!("{}->{}", self.src, self.dst)))?;
        Ok(Relation {
            src: self.src,
            kind,
            dst: self.dst,
            seq: self.seq,
        })
    }
}
