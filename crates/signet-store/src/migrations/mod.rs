//! Migration framework
//!
//! Embedded SQL migrations applied in order, each recorded in
//! `schema_version` with its checksum. Re-running is a no-op.

mod checksums;
mod embedded;
mod runner;

pub use runner::{applied_migrations, apply_migrations};
