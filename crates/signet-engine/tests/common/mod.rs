#![allow(dead_code)]

use std::cell::RefCell;
use std::time::Duration;

use rusqlite::{params, Connection};
use signet_core::errors::{ExError, ExErrorKind};
use signet_core::model::{Document, DocumentBody, Relation, RelationKind, Signature};
use signet_core::pager::PageRequest;
use signet_core::storage::{DocumentStorage, RelationStore, StorageResult};
use signet_engine::CancelToken;
use signet_store::SqliteStorage;

pub fn doc_phid(id: i64) -> String {
    format!("PHID-LEGD-{:04}", id)
}

pub fn body_phid(id: i64, version: u32) -> String {
    format!("PHID-LEGB-{:04}-v{}", id, version)
}

/// Migrated in-memory database with raw-SQL insert helpers
pub struct Fixture {
    pub conn: Connection,
}

impl Fixture {
    pub fn new() -> Self {
        let conn = signet_store::db::open_in_memory_migrated().expect("migrated database");
        Self { conn }
    }

    /// Insert a document at `version` with a body for that version
    pub fn document(&self, id: i64, creator: &str, version: u32, created_at: i64) -> String {
        let phid = self.document_without_body(id, creator, version, created_at);
        self.conn
            .execute(
                "INSERT INTO document_bodies (phid, document_phid, version, title, text, creator_phid, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    body_phid(id, version),
                    phid,
                    version,
                    format!("Document {}", id),
                    format!("Text of document {} at version {}", id, version),
                    creator,
                    created_at,
                ],
            )
            .expect("insert body");
        phid
    }

    pub fn document_without_body(
        &self,
        id: i64,
        creator: &str,
        version: u32,
        created_at: i64,
    ) -> String {
        let phid = doc_phid(id);
        self.conn
            .execute(
                "INSERT INTO documents (id, phid, title, creator_phid, body_phid, version, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                params![
                    id,
                    phid,
                    format!("Document {}", id),
                    creator,
                    body_phid(id, version),
                    version,
                    created_at,
                ],
            )
            .expect("insert document");
        phid
    }

    /// Insert `count` documents with ids `1..=count` in one transaction
    pub fn documents(&mut self, count: i64, creator: &str) {
        let tx = self.conn.transaction().expect("begin");
        {
            let mut doc = tx
                .prepare(
                    "INSERT INTO documents (id, phid, title, creator_phid, body_phid, version, created_at, updated_at)
                     VALUES (?1, ?2, '', ?3, ?4, 1, ?1, ?1)",
                )
                .expect("prepare");
            let mut body = tx
                .prepare(
                    "INSERT INTO document_bodies (phid, document_phid, version, title, text, creator_phid, created_at)
                     VALUES (?1, ?2, 1, '', 'text', ?3, ?4)",
                )
                .expect("prepare");
            for id in 1..=count {
                doc.execute(params![id, doc_phid(id), creator, body_phid(id, 1)])
                    .expect("insert document");
                body.execute(params![body_phid(id, 1), doc_phid(id), creator, id])
                    .expect("insert body");
            }
        }
        tx.commit().expect("commit");
    }

    pub fn contributor(&self, document_phid: &str, user: &str, seq: i64) {
        self.conn
            .execute(
                "INSERT OR IGNORE INTO edges (src, kind, dst, seq) VALUES (?1, ?2, ?3, ?4)",
                params![document_phid, RelationKind::HasContributor.code(), user, seq],
            )
            .expect("insert edge");
    }

    pub fn signature(&self, document_phid: &str, signer: &str, version: u32) {
        self.conn
            .execute(
                "INSERT INTO signatures (document_phid, signer_phid, document_version, signature_data, created_at)
                 VALUES (?1, ?2, ?3, ?4, 0)",
                params![
                    document_phid,
                    signer,
                    version,
                    serde_json::json!({ "name": signer }).to_string(),
                ],
            )
            .expect("insert signature");
    }

    /// Simulate a content edit: bump the version and point at a new body
    pub fn edit(&self, id: i64, new_version: u32) {
        self.conn
            .execute(
                "UPDATE documents SET version = ?2, body_phid = ?3 WHERE id = ?1",
                params![id, new_version, body_phid(id, new_version)],
            )
            .expect("bump version");
        self.conn
            .execute(
                "INSERT INTO document_bodies (phid, document_phid, version, title, text, creator_phid, created_at)
                 SELECT ?1, phid, ?2, title, 'edited', creator_phid, created_at FROM documents WHERE id = ?3",
                params![body_phid(id, new_version), new_version, id],
            )
            .expect("insert edited body");
    }
}

/// Storage wrapper that records every call and can inject failures or delay
pub struct Recording<'conn> {
    inner: SqliteStorage<'conn>,
    calls: RefCell<Vec<&'static str>>,
    fail_on: Option<&'static str>,
    delay: Option<Duration>,
    cancel_after: Option<(&'static str, CancelToken)>,
}

impl<'conn> Recording<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            inner: SqliteStorage::new(conn),
            calls: RefCell::new(Vec::new()),
            fail_on: None,
            delay: None,
            cancel_after: None,
        }
    }

    pub fn failing_on(mut self, call: &'static str) -> Self {
        self.fail_on = Some(call);
        self
    }

    /// Sleep this long inside every call
    pub fn slowed_by(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Trip `token` once `call` has run, as a caller on another thread would
    pub fn cancelling_after(mut self, call: &'static str, token: CancelToken) -> Self {
        self.cancel_after = Some((call, token));
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn reset(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: &'static str) -> StorageResult<()> {
        self.calls.borrow_mut().push(call);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if let Some((after, token)) = &self.cancel_after {
            if *after == call {
                token.cancel();
            }
        }
        if self.fail_on == Some(call) {
            return Err(ExError::new(ExErrorKind::Persistence)
                .with_op(call)
                .with_message("injected failure"));
        }
        Ok(())
    }
}

impl DocumentStorage for Recording<'_> {
    fn fetch_documents(&self, request: &PageRequest) -> StorageResult<Vec<Document>> {
        self.record("fetch_documents")?;
        self.inner.fetch_documents(request)
    }

    fn load_bodies(&self, body_phids: &[String]) -> StorageResult<Vec<DocumentBody>> {
        self.record("load_bodies")?;
        self.inner.load_bodies(body_phids)
    }

    fn load_signatures(&self, document_phids: &[String]) -> StorageResult<Vec<Signature>> {
        self.record("load_signatures")?;
        self.inner.load_signatures(document_phids)
    }
}

impl RelationStore for Recording<'_> {
    fn list_by_sources(
        &self,
        sources: &[String],
        kind: RelationKind,
    ) -> StorageResult<Vec<Relation>> {
        self.record("list_by_sources")?;
        self.inner.list_by_sources(sources, kind)
    }

    fn list_by_destinations(
        &self,
        destinations: &[String],
        kind: RelationKind,
    ) -> StorageResult<Vec<Relation>> {
        self.record("list_by_destinations")?;
        self.inner.list_by_destinations(destinations, kind)
    }
}
