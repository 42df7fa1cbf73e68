#![allow(dead_code)]

use rusqlite::{params, Connection};
use signet_core::model::RelationKind;

/// Migrated in-memory database with raw-SQL insert helpers
pub struct Fixture {
    pub conn: Connection,
}

pub fn doc_phid(id: i64) -> String {
    format!("PHID-LEGD-{:04}", id)
}

pub fn body_phid(id: i64, version: u32) -> String {
    format!("PHID-LEGB-{:04}-v{}", id, version)
}

impl Fixture {
    pub fn new() -> Self {
        let conn = signet_store::db::open_in_memory_migrated().expect("migrated database");
        Self { conn }
    }

    /// Insert a document at `version` together with its current body
    pub fn document(&self, id: i64, creator: &str, version: u32, created_at: i64) -> String {
        let phid = doc_phid(id);
        self.document_without_body(id, creator, version, created_at);
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

    /// Insert a document whose body reference does not resolve
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

    /// Record `user` as a contributor of `document_phid`, with both edge directions
    pub fn contributor(&self, document_phid: &str, user: &str, seq: i64) {
        let mut stmt = self
            .conn
            .prepare("INSERT OR IGNORE INTO edges (src, kind, dst, seq) VALUES (?1, ?2, ?3, ?4)")
            .expect("prepare edge insert");
        stmt.execute(params![
            document_phid,
            RelationKind::HasContributor.code(),
            user,
            seq
        ])
        .expect("insert edge");
        stmt.execute(params![
            user,
            RelationKind::ContributedTo.code(),
            document_phid,
            seq
        ])
        .expect("insert inverse edge");
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
                    serde_json::json!({ "name": signer, "email": format!("{}@example.com", signer) })
                        .to_string(),
                ],
            )
            .expect("insert signature");
    }
}
