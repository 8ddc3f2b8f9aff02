//! The global pool counter: the next pool id to assign.
//!
//! Stored at [`StoreKey::NextPoolNumber`] as 8 big-endian bytes. Only
//! genesis and [`super::PoolRegistry::create_pool`] write it.

use crate::error::RegistryError;
use crate::store::codec::{decode_counter, encode_counter};
use crate::store::{KvRead, KvStore, StoreKey};

/// Reads the counter; `Ok(None)` if genesis never wrote it.
///
/// # Errors
///
/// Returns [`RegistryError::CorruptedCounter`] if the stored bytes are not a
/// valid counter, or [`RegistryError::Store`] on backend failure.
pub fn get<S: KvRead + ?Sized>(store: &S) -> Result<Option<u64>, RegistryError> {
    let key = StoreKey::NextPoolNumber;
    let Some(bytes) = store.get(&key.encode())? else {
        return Ok(None);
    };
    decode_counter(&bytes)
        .map(Some)
        .map_err(|source| RegistryError::CorruptedCounter { key, source })
}

/// Reads the counter, failing if genesis never wrote it.
///
/// # Errors
///
/// Returns [`RegistryError::Uninitialized`] when the counter is absent, plus
/// everything [`get`] returns.
pub fn require<S: KvRead + ?Sized>(store: &S) -> Result<u64, RegistryError> {
    get(store)?.ok_or(RegistryError::Uninitialized("next pool number"))
}

/// Overwrites the counter.
///
/// # Errors
///
/// Returns [`RegistryError::Store`] on backend failure.
pub fn set<S: KvStore + ?Sized>(store: &mut S, value: u64) -> Result<(), RegistryError> {
    store.set(&StoreKey::NextPoolNumber.encode(), &encode_counter(value))?;
    Ok(())
}
