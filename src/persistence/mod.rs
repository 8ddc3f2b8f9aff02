//! Persistence layer: durable PostgreSQL copy of the registry store.
//!
//! The in-memory [`crate::store::MemStore`] is the source of truth while the
//! node runs. Each committed block's change set is mirrored into PostgreSQL
//! and the whole table is loaded back on startup.

pub mod models;
pub mod postgres;

pub use models::CommitRecord;
pub use postgres::PostgresPersistence;
