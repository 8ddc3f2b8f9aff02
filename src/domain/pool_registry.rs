//! Store-backed pool registry.
//!
//! [`PoolRegistry`] owns the pool-record family and the global counter of
//! whatever store it wraps. It is generic over the store so the same code
//! runs against a committed snapshot (reads) and against a transition's
//! write cache (creation and updates).
//!
//! Creation assigns the current counter value and then stores `counter + 1`.
//! The two writes are only atomic because callers run them inside a
//! [`crate::store::CacheStore`] that commits or drops as a whole.

use super::pool::validate_pool;
use super::{GenesisState, NewPool, Params, Pool, PoolId, pool_counter, pool_records};
use crate::error::RegistryError;
use crate::store::{KvRead, KvStore, StoreKey, codec};

/// Registry of liquidity pools over a sorted byte-key store.
#[derive(Debug)]
pub struct PoolRegistry<S> {
    store: S,
}

impl<S: KvRead> PoolRegistry<S> {
    /// Wraps a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the wrapped store.
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Looks up a pool by id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::PoolNotFound`] if nothing is stored under
    /// `id`, [`RegistryError::DataCorruption`] if the record does not decode
    /// or carries another id, and [`RegistryError::Store`] on backend failure.
    pub fn get_pool(&self, id: PoolId) -> Result<Pool, RegistryError> {
        let bytes = pool_records::get(&self.store, id)?.ok_or(RegistryError::PoolNotFound(id))?;
        decode_pool(id, &bytes)
    }

    /// Returns the id the next created pool will receive.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Uninitialized`] if genesis never wrote the
    /// counter, or [`RegistryError::CorruptedCounter`] if it is malformed.
    pub fn next_pool_number(&self) -> Result<u64, RegistryError> {
        pool_counter::require(&self.store)
    }

    /// Returns the module parameters.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Uninitialized`] if genesis never wrote them,
    /// or [`RegistryError::DataCorruption`] if they do not decode.
    pub fn params(&self) -> Result<Params, RegistryError> {
        let key = StoreKey::Params;
        let bytes = self
            .store
            .get(&key.encode())?
            .ok_or(RegistryError::Uninitialized("params"))?;
        codec::decode(&bytes).map_err(|source| RegistryError::DataCorruption { key, source })
    }

    /// Returns up to `limit` pools in ascending id order, skipping the first
    /// `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DataCorruption`] if a returned record does
    /// not decode or sits under another pool's key, or
    /// [`RegistryError::Store`] on backend failure.
    pub fn list_pools(&self, offset: usize, limit: usize) -> Result<Vec<Pool>, RegistryError> {
        Ok(self.pools_page(offset, limit)?.0)
    }

    /// Returns one page of pools together with the number of stored pools,
    /// reading the pool family once.
    ///
    /// # Errors
    ///
    /// Same as [`PoolRegistry::list_pools`].
    pub fn pools_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<Pool>, usize), RegistryError> {
        let (records, total) = pool_records::page(&self.store, offset, limit)?;
        let pools = records
            .into_iter()
            .map(|(id, bytes)| decode_pool(id, &bytes))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((pools, total))
    }

    /// Returns the number of stored pools.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Store`] on backend failure.
    pub fn pool_count(&self) -> Result<usize, RegistryError> {
        Ok(pool_records::page(&self.store, 0, 0)?.1)
    }

    /// Exports params, counter and every pool.
    ///
    /// # Errors
    ///
    /// Returns any error raised while reading the singletons or pools.
    pub fn export_genesis(&self) -> Result<GenesisState, RegistryError> {
        Ok(GenesisState {
            params: self.params()?,
            next_pool_number: Some(self.next_pool_number()?),
            pools: self.list_pools(0, usize::MAX)?,
        })
    }
}

impl<S: KvStore> PoolRegistry<S> {
    /// Creates a pool under the current counter value and advances the
    /// counter by one. Returns the assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Uninitialized`] if the counter or params are
    /// missing, [`RegistryError::CounterOverflow`] if the counter is at
    /// `u64::MAX`, and [`RegistryError::InvalidArgument`] for an invalid
    /// payload or a denom outside the whitelist.
    pub fn create_pool(&mut self, new_pool: NewPool) -> Result<PoolId, RegistryError> {
        let current = pool_counter::require(&self.store)?;
        let id = PoolId::new(current);
        let next = id.checked_next().ok_or(RegistryError::CounterOverflow)?;

        let params = self.params()?;
        if let Some(asset) = new_pool
            .assets
            .iter()
            .find(|a| !params.is_whitelisted(&a.token.denom))
        {
            return Err(RegistryError::InvalidArgument(format!(
                "asset {} is not whitelisted",
                asset.token.denom
            )));
        }

        let pool = new_pool.into_pool(id)?;
        self.write_pool(&pool)?;
        pool_counter::set(&mut self.store, next.get())?;

        tracing::debug!(%id, next = next.get(), "pool record written");
        Ok(id)
    }

    /// Overwrites an existing pool in place.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::PoolNotFound`] if no pool is stored under
    /// `pool.id`, and [`RegistryError::InvalidArgument`] if the new record is
    /// malformed.
    pub fn set_pool(&mut self, pool: &Pool) -> Result<(), RegistryError> {
        if pool_records::get(&self.store, pool.id)?.is_none() {
            return Err(RegistryError::PoolNotFound(pool.id));
        }
        validate_pool(pool)?;
        self.write_pool(pool)
    }

    /// Writes the module parameters.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidGenesis`] for invalid params.
    pub fn set_params(&mut self, params: &Params) -> Result<(), RegistryError> {
        params.validate()?;
        let key = StoreKey::Params;
        let bytes = codec::encode(params).map_err(|source| RegistryError::Encode { key, source })?;
        self.store.set(&key.encode(), &bytes)?;
        Ok(())
    }

    /// Writes params, the counter and any imported pools.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidGenesis`] if the state is invalid or
    /// the registry was already initialized.
    pub fn init_genesis(&mut self, genesis: &GenesisState) -> Result<(), RegistryError> {
        genesis.validate()?;
        if pool_counter::get(&self.store)?.is_some() {
            return Err(RegistryError::InvalidGenesis(
                "registry is already initialized".to_string(),
            ));
        }

        self.set_params(&genesis.params)?;
        pool_counter::set(&mut self.store, genesis.next_pool_number())?;
        for pool in &genesis.pools {
            self.write_pool(pool)?;
        }

        tracing::info!(
            next_pool_number = genesis.next_pool_number(),
            pools = genesis.pools.len(),
            "registry genesis written"
        );
        Ok(())
    }

    fn write_pool(&mut self, pool: &Pool) -> Result<(), RegistryError> {
        let bytes = codec::encode(pool).map_err(|source| RegistryError::Encode {
            key: StoreKey::Pool(pool.id),
            source,
        })?;
        pool_records::put(&mut self.store, pool.id, &bytes)
    }
}

/// Decodes the record read from `id`'s key, rejecting records that carry
/// another id.
fn decode_pool(id: PoolId, bytes: &[u8]) -> Result<Pool, RegistryError> {
    let key = StoreKey::Pool(id);
    let pool: Pool =
        codec::decode(bytes).map_err(|source| RegistryError::DataCorruption { key, source })?;
    if pool.id != id {
        return Err(RegistryError::DataCorruption {
            key,
            source: codec::CodecError::Decode(format!(
                "record under pool {id} carries id {}",
                pool.id
            )),
        });
    }
    Ok(pool)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::pool::tests::new_pool;
    use crate::store::MemStore;
    use tokio_test::{assert_err, assert_ok};

    fn genesis_at(next: u64) -> GenesisState {
        GenesisState {
            next_pool_number: Some(next),
            ..GenesisState::default()
        }
    }

    fn registry_at(next: u64) -> PoolRegistry<MemStore> {
        let mut registry = PoolRegistry::new(MemStore::new());
        assert_ok!(registry.init_genesis(&genesis_at(next)));
        registry
    }

    #[test]
    fn scenario_create_two_then_query() {
        let mut registry = registry_at(0);

        let a = new_pool("uatom", "umtrx");
        let b = new_pool("uosmo", "umtrx");
        assert_eq!(assert_ok!(registry.create_pool(a.clone())), PoolId::new(0));
        assert_eq!(assert_ok!(registry.create_pool(b)), PoolId::new(1));
        assert_eq!(assert_ok!(registry.next_pool_number()), 2);

        let fetched = assert_ok!(registry.get_pool(PoolId::new(0)));
        assert_eq!(fetched.assets, a.assets);
        assert_eq!(fetched.params, a.params);

        assert!(matches!(
            registry.get_pool(PoolId::new(5)),
            Err(RegistryError::PoolNotFound(id)) if id == PoolId::new(5)
        ));
    }

    #[test]
    fn ids_increase_by_one_from_initial_counter() {
        let mut registry = registry_at(17);
        let mut ids = Vec::new();
        for i in 0..10u64 {
            let denom = format!("u{i}");
            ids.push(assert_ok!(registry.create_pool(new_pool(&denom, "umtrx"))));
        }
        let expected: Vec<PoolId> = (17..27).map(PoolId::new).collect();
        assert_eq!(ids, expected);
        assert_eq!(assert_ok!(registry.next_pool_number()), 27);
    }

    #[test]
    fn created_payload_round_trips_exactly() {
        let mut registry = registry_at(1);
        let payload = new_pool("uatom", "umtrx");
        let id = assert_ok!(registry.create_pool(payload.clone()));
        let Ok(expected) = payload.into_pool(id) else {
            panic!("valid payload");
        };
        assert_eq!(assert_ok!(registry.get_pool(id)), expected);
    }

    #[test]
    fn queries_before_genesis_are_fatal() {
        let registry = PoolRegistry::new(MemStore::new());
        let err = assert_err!(registry.next_pool_number());
        assert!(matches!(err, RegistryError::Uninitialized(_)));
        assert!(err.is_fatal());

        let err = assert_err!(registry.params());
        assert!(err.is_fatal());
    }

    #[test]
    fn create_before_genesis_is_fatal_and_writes_nothing() {
        let mut registry = PoolRegistry::new(MemStore::new());
        let err = assert_err!(registry.create_pool(new_pool("uatom", "umtrx")));
        assert!(err.is_fatal());
        assert!(registry.into_inner().is_empty());
    }

    #[test]
    fn counter_overflow_is_fatal() {
        let mut registry = registry_at(u64::MAX);
        let err = assert_err!(registry.create_pool(new_pool("uatom", "umtrx")));
        assert!(matches!(err, RegistryError::CounterOverflow));
        assert_eq!(assert_ok!(registry.next_pool_number()), u64::MAX);
        assert_eq!(assert_ok!(registry.pool_count()), 0);
    }

    #[test]
    fn invalid_payload_leaves_counter_untouched() {
        let mut registry = registry_at(4);
        assert_err!(registry.create_pool(new_pool("uatom", "uatom")));
        assert_eq!(assert_ok!(registry.next_pool_number()), 4);
    }

    #[test]
    fn whitelist_is_enforced() {
        let mut registry = PoolRegistry::new(MemStore::new());
        let genesis = GenesisState {
            params: Params {
                whitelisted_assets: vec!["uatom".to_string(), "umtrx".to_string()],
                ..Params::default()
            },
            ..GenesisState::default()
        };
        assert_ok!(registry.init_genesis(&genesis));
        assert_ok!(registry.create_pool(new_pool("uatom", "umtrx")));
        assert_err!(registry.create_pool(new_pool("uosmo", "umtrx")));
    }

    #[test]
    fn corrupted_record_is_distinct_from_missing() {
        let mut registry = registry_at(0);
        let id = assert_ok!(registry.create_pool(new_pool("uatom", "umtrx")));

        let mut store = registry.into_inner();
        assert_ok!(store.set(&StoreKey::Pool(id).encode(), &[0xff, 0x00]));
        let registry = PoolRegistry::new(store);

        let err = assert_err!(registry.get_pool(id));
        assert!(matches!(err, RegistryError::DataCorruption { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn record_under_wrong_key_is_corruption() {
        let mut registry = registry_at(0);
        let id = assert_ok!(registry.create_pool(new_pool("uatom", "umtrx")));
        let pool = assert_ok!(registry.get_pool(id));

        let mut store = registry.into_inner();
        let Ok(bytes) = codec::encode(&pool) else {
            panic!("encode failed");
        };
        assert_ok!(store.set(&StoreKey::Pool(PoolId::new(9)).encode(), &bytes));
        let registry = PoolRegistry::new(store);

        assert!(matches!(
            registry.get_pool(PoolId::new(9)),
            Err(RegistryError::DataCorruption { .. })
        ));
    }

    #[test]
    fn listing_rejects_record_under_wrong_key() {
        let mut registry = registry_at(0);
        let id = assert_ok!(registry.create_pool(new_pool("uatom", "umtrx")));
        let pool = assert_ok!(registry.get_pool(id));

        let mut store = registry.into_inner();
        let Ok(bytes) = codec::encode(&pool) else {
            panic!("encode failed");
        };
        assert_ok!(store.set(&StoreKey::Pool(PoolId::new(9)).encode(), &bytes));
        let registry = PoolRegistry::new(store);

        let err = assert_err!(registry.list_pools(0, 10));
        assert!(matches!(
            err,
            RegistryError::DataCorruption { key: StoreKey::Pool(id), .. } if id == PoolId::new(9)
        ));
        assert!(matches!(
            registry.export_genesis(),
            Err(RegistryError::DataCorruption { .. })
        ));
        // the first page stops before the misplaced record
        assert_eq!(assert_ok!(registry.list_pools(0, 1)).len(), 1);
        assert_eq!(assert_ok!(registry.pool_count()), 2);
    }

    #[test]
    fn set_pool_updates_in_place_and_requires_existing() {
        let mut registry = registry_at(0);
        let id = assert_ok!(registry.create_pool(new_pool("uatom", "umtrx")));

        let mut pool = assert_ok!(registry.get_pool(id));
        if let Some(asset) = pool.assets.first_mut() {
            asset.token.amount = 42;
        }
        assert_ok!(registry.set_pool(&pool));
        assert_eq!(assert_ok!(registry.get_pool(id)), pool);
        assert_eq!(assert_ok!(registry.pool_count()), 1);
        assert_eq!(assert_ok!(registry.next_pool_number()), 1);

        pool.id = PoolId::new(8);
        assert!(matches!(
            registry.set_pool(&pool),
            Err(RegistryError::PoolNotFound(_))
        ));
    }

    #[test]
    fn list_pools_pages_in_id_order() {
        let mut registry = registry_at(0);
        for i in 0..5u64 {
            let denom = format!("u{i}");
            assert_ok!(registry.create_pool(new_pool(&denom, "umtrx")));
        }
        let page: Vec<u64> = assert_ok!(registry.list_pools(1, 2))
            .into_iter()
            .map(|p| p.id.get())
            .collect();
        assert_eq!(page, vec![1, 2]);
        assert_eq!(assert_ok!(registry.pool_count()), 5);
        assert!(assert_ok!(registry.list_pools(10, 2)).is_empty());

        let (pools, total) = assert_ok!(registry.pools_page(4, 3));
        assert_eq!(total, 5);
        assert_eq!(pools.len(), 1);
    }

    #[test]
    fn genesis_runs_once() {
        let mut registry = registry_at(0);
        assert!(matches!(
            registry.init_genesis(&genesis_at(0)),
            Err(RegistryError::InvalidGenesis(_))
        ));
    }

    #[test]
    fn export_then_import_round_trips() {
        let mut registry = registry_at(3);
        assert_ok!(registry.create_pool(new_pool("uatom", "umtrx")));
        assert_ok!(registry.create_pool(new_pool("uosmo", "umtrx")));
        let exported = assert_ok!(registry.export_genesis());
        assert_eq!(exported.next_pool_number, Some(5));
        assert_eq!(exported.pools.len(), 2);

        let mut imported = PoolRegistry::new(MemStore::new());
        assert_ok!(imported.init_genesis(&exported));
        assert_eq!(assert_ok!(imported.export_genesis()), exported);
        assert_eq!(imported.into_inner(), registry.into_inner());
    }
}
