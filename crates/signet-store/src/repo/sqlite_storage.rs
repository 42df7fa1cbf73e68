//! SQLite implementation of the storage traits
//!
//! One call, one statement. Batched loaders bind the whole key set as one
//! JSON array parameter, and return without touching the database when
//! given nothing to look up.

#![allow(clippy::result_large_err)]

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use signet_core::model::{Document, DocumentBody, Relation, RelationKind, Signature};
use signet_core::pager::PageRequest;
use signet_core::storage::{DocumentStorage, RelationStore, StorageResult};

use crate::errors::query_failed;
use crate::repo::predicate_sql::{render_fetch, set_param, SET_PARAM};
use crate::repo::rows::{
    row_to_body, row_to_document, row_to_relation, row_to_signature, BODY_COLUMNS,
    RELATION_COLUMNS, SIGNATURE_COLUMNS,
};

/// Read-only view over a migrated signet database
pub struct SqliteStorage<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStorage<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query<T>(
        &self,
        op: &str,
        sql: &str,
        params: Vec<Value>,
        map: impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    ) -> StorageResult<Vec<T>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| query_failed(op, e))?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), map)
            .map_err(|e| query_failed(op, e))?
            .collect::<rusqlite::Result<Vec<T>>>()
            .map_err(|e| query_failed(op, e))?;
        tracing::debug!(op, rows = rows.len(), "storage query");
        Ok(rows)
    }

    fn list_edges(
        &self,
        op: &str,
        key_column: &str,
        order_by: &str,
        keys: &[String],
        kind: RelationKind,
    ) -> StorageResult<Vec<Relation>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM edges WHERE kind = ? AND {} IN ({}) ORDER BY {}",
            RELATION_COLUMNS, key_column, SET_PARAM, order_by
        );
        let params = vec![Value::Integer(kind.code()), set_param(keys.iter().cloned())];
        self.query(op, &sql, params, row_to_relation)?
            .into_iter()
            .map(|row| row.into_relation())
            .collect()
    }
}

fn key_set(keys: &[String]) -> Vec<Value> {
    vec![set_param(keys.iter().cloned())]
}

impl DocumentStorage for SqliteStorage<'_> {
    fn fetch_documents(&self, request: &PageRequest) -> StorageResult<Vec<Document>> {
        let stmt = render_fetch(request);
        self.query("fetch_documents", &stmt.sql, stmt.params, row_to_document)
    }

    fn load_bodies(&self, body_phids: &[String]) -> StorageResult<Vec<DocumentBody>> {
        if body_phids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM document_bodies WHERE phid IN ({})",
            BODY_COLUMNS, SET_PARAM
        );
        self.query("load_bodies", &sql, key_set(body_phids), row_to_body)
    }

    fn load_signatures(&self, document_phids: &[String]) -> StorageResult<Vec<Signature>> {
        if document_phids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM signatures WHERE document_phid IN ({}) ORDER BY id",
            SIGNATURE_COLUMNS, SET_PARAM
        );
        self.query(
            "load_signatures",
            &sql,
            key_set(document_phids),
            row_to_signature,
        )?
        .into_iter()
        .map(|row| row.into_signature())
        .collect()
    }
}

impl RelationStore for SqliteStorage<'_> {
    fn list_by_sources(
        &self,
        sources: &[String],
        kind: RelationKind,
    ) -> StorageResult<Vec<Relation>> {
        self.list_edges("list_by_sources", "src", "src, seq, dst", sources, kind)
    }

    fn list_by_destinations(
        &self,
        destinations: &[String],
        kind: RelationKind,
    ) -> StorageResult<Vec<Relation>> {
        self.list_edges(
            "list_by_destinations",
            "dst",
            "dst, seq, src",
            destinations,
            kind,
        )
    }
}
