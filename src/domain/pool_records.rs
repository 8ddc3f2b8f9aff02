//! Raw access to pool records under the [`KeyPrefix::Pool`] family.

use super::PoolId;
use crate::error::RegistryError;
use crate::store::{KeyPrefix, KvPairs, KvRead, KvStore, StoreKey};

/// Writes `payload` at the pool's key, overwriting any previous record.
///
/// # Errors
///
/// Returns [`RegistryError::Store`] on backend failure.
pub fn put<S: KvStore + ?Sized>(
    store: &mut S,
    id: PoolId,
    payload: &[u8],
) -> Result<(), RegistryError> {
    store.set(&StoreKey::Pool(id).encode(), payload)?;
    Ok(())
}

/// Returns the raw record stored for `id`, if any.
///
/// # Errors
///
/// Returns [`RegistryError::Store`] on backend failure.
pub fn get<S: KvRead + ?Sized>(store: &S, id: PoolId) -> Result<Option<Vec<u8>>, RegistryError> {
    Ok(store.get(&StoreKey::Pool(id).encode())?)
}

/// Returns every pool record in ascending id order.
///
/// Keys under the pool prefix that do not decode to a pool key are skipped
/// with a warning; nothing but the registry writes this family.
///
/// # Errors
///
/// Returns [`RegistryError::Store`] on backend failure.
pub fn scan<S: KvRead + ?Sized>(store: &S) -> Result<Vec<(PoolId, Vec<u8>)>, RegistryError> {
    let pairs = store.prefix_scan(KeyPrefix::Pool.as_bytes())?;
    Ok(pool_entries(pairs))
}

/// Returns up to `limit` records in ascending id order after skipping
/// `offset`, plus the number of keys in the pool family.
///
/// Only the requested page is copied out of the store.
///
/// # Errors
///
/// Returns [`RegistryError::Store`] on backend failure.
pub fn page<S: KvRead + ?Sized>(
    store: &S,
    offset: usize,
    limit: usize,
) -> Result<(Vec<(PoolId, Vec<u8>)>, usize), RegistryError> {
    let (pairs, total) = store.prefix_page(KeyPrefix::Pool.as_bytes(), offset, limit)?;
    Ok((pool_entries(pairs), total))
}

fn pool_entries(pairs: KvPairs) -> Vec<(PoolId, Vec<u8>)> {
    let mut records = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        match StoreKey::decode(&key) {
            Some(StoreKey::Pool(id)) => records.push((id, value)),
            _ => tracing::warn!(key = %hex::encode(&key), "skipping foreign key in pool family"),
        }
    }
    records
}
