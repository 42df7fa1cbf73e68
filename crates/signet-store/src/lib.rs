//! Signet Store - SQLite persistence for the document query core
//!
//! Provides:
//! - Connection helpers and embedded, checksummed migrations
//! - Rendering of typed predicates into parameterised SQL
//! - `SqliteStorage`, the rusqlite implementation of the storage traits

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

pub use errors::Result;
pub use repo::SqliteStorage;
