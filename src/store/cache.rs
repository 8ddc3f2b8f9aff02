//! Write-buffering overlay used to make a state transition atomic.
//!
//! A [`CacheStore`] reads through to its parent and keeps every write in a
//! local buffer. Nothing reaches the parent until the buffered
//! [`ChangeSet`] is applied, so dropping the cache discards the transition.
//! Caches nest: a per-message cache over a per-block cache.

use std::collections::BTreeMap;

use super::kv::{KvPairs, KvRead, KvStore, StoreError};

/// Ordered set of pending writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    writes: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl ChangeSet {
    /// Number of keys touched.
    #[must_use]
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Returns `true` if nothing was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Iterates the pending writes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.writes
            .iter()
            .map(|(k, v)| (k.as_slice(), v.as_slice()))
    }
}

/// Buffered view over a parent store.
#[derive(Debug)]
pub struct CacheStore<P> {
    parent: P,
    pending: ChangeSet,
}

impl<P: KvRead> CacheStore<P> {
    /// Wraps `parent` with an empty write buffer.
    pub fn new(parent: P) -> Self {
        Self {
            parent,
            pending: ChangeSet::default(),
        }
    }

    /// Consumes the cache, returning the buffered writes.
    #[must_use]
    pub fn into_change_set(self) -> ChangeSet {
        self.pending
    }

    /// Merges writes produced by a nested cache into this one.
    pub fn absorb(&mut self, changes: ChangeSet) {
        self.pending.writes.extend(changes.writes);
    }
}

impl<P: KvRead> KvRead for CacheStore<P> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        match self.pending.writes.get(key) {
            Some(buffered) => Ok(Some(buffered.clone())),
            None => self.parent.get(key),
        }
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<KvPairs, StoreError> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.parent.prefix_scan(prefix)?.into_iter().collect();
        let buffered = self
            .pending
            .writes
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix));
        for (key, value) in buffered {
            merged.insert(key.clone(), value.clone());
        }
        Ok(merged.into_iter().collect())
    }
}

impl<P: KvRead> KvStore for CacheStore<P> {
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.pending.writes.insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}
