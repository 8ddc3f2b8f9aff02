//! Domain layer: pool entity, identifiers, params, genesis, and the
//! store-backed pool registry.
//!
//! The registry's two key families are handled by small focused modules:
//! [`pool_counter`] for the next-id singleton and [`pool_records`] for the
//! per-pool records. [`PoolRegistry`] composes them.

pub mod coin;
pub mod genesis;
pub mod params;
pub mod pool;
pub mod pool_counter;
pub mod pool_id;
pub mod pool_records;
pub mod pool_registry;

pub use coin::Coin;
pub use genesis::GenesisState;
pub use params::Params;
pub use pool::{NewPool, Pool, PoolAsset, PoolParams};
pub use pool_id::PoolId;
pub use pool_registry::PoolRegistry;
