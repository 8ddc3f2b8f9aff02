//! Sorted byte-key store abstraction and its in-memory implementation.

use std::collections::BTreeMap;

use super::cache::ChangeSet;

/// Ordered list of key/value pairs returned by a prefix scan.
pub type KvPairs = Vec<(Vec<u8>, Vec<u8>)>;

/// Storage-layer failure.
///
/// The in-memory store never produces one; durable backends and wrappers
/// over them do, and the registry treats every variant as fatal.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store rejected or failed the operation.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Read access to a sorted byte-key store.
pub trait KvRead {
    /// Returns the value stored at `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Returns every pair whose key starts with `prefix`, in ascending key order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<KvPairs, StoreError>;

    /// Returns up to `limit` pairs under `prefix` after skipping `offset`,
    /// together with the total number of keys under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    fn prefix_page(
        &self,
        prefix: &[u8],
        offset: usize,
        limit: usize,
    ) -> Result<(KvPairs, usize), StoreError> {
        let pairs = self.prefix_scan(prefix)?;
        let total = pairs.len();
        Ok((pairs.into_iter().skip(offset).take(limit).collect(), total))
    }
}

/// Read-write access to a sorted byte-key store.
///
/// Registry records are only ever written or overwritten, so the trait has
/// no deletion.
pub trait KvStore: KvRead {
    /// Writes `value` at `key`, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be written.
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;
}

impl<T: KvRead + ?Sized> KvRead for &T {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<KvPairs, StoreError> {
        (**self).prefix_scan(prefix)
    }

    fn prefix_page(
        &self,
        prefix: &[u8],
        offset: usize,
        limit: usize,
    ) -> Result<(KvPairs, usize), StoreError> {
        (**self).prefix_page(prefix, offset, limit)
    }
}

impl<T: KvRead + ?Sized> KvRead for &mut T {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<KvPairs, StoreError> {
        (**self).prefix_scan(prefix)
    }

    fn prefix_page(
        &self,
        prefix: &[u8],
        offset: usize,
        limit: usize,
    ) -> Result<(KvPairs, usize), StoreError> {
        (**self).prefix_page(prefix, offset, limit)
    }
}

impl<T: KvStore + ?Sized> KvStore for &mut T {
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// In-memory sorted store backed by a [`BTreeMap`].
///
/// Committed snapshots are held as `Arc<MemStore>`. A block's change set is
/// applied in place when no reader holds the snapshot, and to a copy
/// otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Applies every write of `changes` in key order.
    pub fn apply(&mut self, changes: &ChangeSet) {
        for (key, value) in changes.iter() {
            self.data.insert(key.to_vec(), value.to_vec());
        }
    }
}

impl FromIterator<(Vec<u8>, Vec<u8>)> for MemStore {
    fn from_iter<I: IntoIterator<Item = (Vec<u8>, Vec<u8>)>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

impl KvRead for MemStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<KvPairs, StoreError> {
        Ok(self
            .data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn prefix_page(
        &self,
        prefix: &[u8],
        offset: usize,
        limit: usize,
    ) -> Result<(KvPairs, usize), StoreError> {
        let mut total = 0;
        let mut page = Vec::new();
        for (key, value) in self
            .data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
        {
            if total >= offset && page.len() < limit {
                page.push((key.clone(), value.clone()));
            }
            total += 1;
        }
        Ok((page, total))
    }
}

impl KvStore for MemStore {
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}
