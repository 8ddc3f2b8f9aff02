//! Storage layer: typed keys, value codec, and sorted byte-key stores.
//!
//! The registry never touches raw keys directly; it goes through
//! [`StoreKey`] so the pool-record and singleton families stay disjoint.

pub mod cache;
pub mod codec;
pub mod keys;
pub mod kv;

pub use cache::{CacheStore, ChangeSet};
pub use codec::CodecError;
pub use keys::{KeyPrefix, StoreKey};
pub use kv::{KvPairs, KvRead, KvStore, MemStore, StoreError};
