//! Repository layer: SQLite implementations of the storage traits

pub mod predicate_sql;
mod rows;
pub mod sqlite_storage;

pub use predicate_sql::{render_fetch, FetchStatement};
pub use sqlite_storage::SqliteStorage;
