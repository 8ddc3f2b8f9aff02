//! # dex-registry
//!
//! Deterministic liquidity-pool registry hosted in a small state machine,
//! with a read-only query gateway over HTTP.
//!
//! Pools live in a sorted key-value store under typed, big-endian keys. A
//! single persisted counter mints pool ids: every creation writes the pool
//! at the current value and stores the value plus one, inside a block that
//! commits atomically. Queries always read the last committed snapshot.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── QueryService (service/)      read path
//!     ├── ChainState (chain/)          write path, block commit
//!     │
//!     ├── PoolRegistry (domain/)
//!     ├── pool_counter, pool_records (domain/)
//!     │
//!     ├── MemStore, CacheStore, StoreKey, codec (store/)
//!     │
//!     └── PostgreSQL Persistence
//! ```

pub mod api;
pub mod app_state;
pub mod chain;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod store;
