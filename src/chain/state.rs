//! Serialized block execution over committed snapshots.
//!
//! [`ChainState`] is the host the registry runs inside. Blocks execute one
//! at a time: each builds a write cache over the last committed snapshot,
//! runs its messages in nested per-message caches, and on success persists
//! the change set and publishes a new snapshot. Readers only ever see
//! committed snapshots.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use super::msg::{Msg, TxResult};
use crate::domain::{GenesisState, PoolRegistry};
use crate::error::RegistryError;
use crate::persistence::PostgresPersistence;
use crate::store::{CacheStore, ChangeSet, KvStore, MemStore};

/// An immutable committed state at a given height.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Height of the last committed block (0 = genesis only).
    pub height: u64,
    /// Committed store contents.
    pub store: Arc<MemStore>,
}

impl Snapshot {
    /// Read-only registry over this snapshot.
    #[must_use]
    pub fn registry(&self) -> PoolRegistry<&MemStore> {
        PoolRegistry::new(self.store.as_ref())
    }
}

/// Outcome of a committed block.
#[derive(Debug)]
pub struct BlockOutcome {
    /// Height the block was committed at.
    pub height: u64,
    /// Per-message results, in submission order. Failed messages left no
    /// writes behind.
    pub results: Vec<Result<TxResult, RegistryError>>,
}

/// State-machine host owning the committed registry store.
#[derive(Debug)]
pub struct ChainState {
    committed: RwLock<Snapshot>,
    writer: Mutex<()>,
    persistence: Option<PostgresPersistence>,
}

impl ChainState {
    /// Creates a host over `store` committed at `height`.
    #[must_use]
    pub fn new(store: MemStore, height: u64, persistence: Option<PostgresPersistence>) -> Self {
        Self {
            committed: RwLock::new(Snapshot {
                height,
                store: Arc::new(store),
            }),
            writer: Mutex::new(()),
            persistence,
        }
    }

    /// Creates an empty, non-persistent host at height 0.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemStore::new(), 0, None)
    }

    /// Returns the latest committed snapshot.
    pub async fn snapshot(&self) -> Snapshot {
        self.committed.read().await.clone()
    }

    /// Height of the latest committed block.
    pub async fn height(&self) -> u64 {
        self.committed.read().await.height
    }

    /// Writes the genesis state and commits it without advancing height.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidGenesis`] if the state is invalid or
    /// genesis already ran, or [`RegistryError::Store`] if persisting fails.
    pub async fn init_genesis(&self, genesis: &GenesisState) -> Result<(), RegistryError> {
        let _writer = self.writer.lock().await;
        let base = self.snapshot().await;

        let mut cache = CacheStore::new(base.store.as_ref());
        PoolRegistry::new(&mut cache).init_genesis(genesis)?;
        let changes = cache.into_change_set();

        let height = base.height;
        self.commit(base, height, changes).await
    }

    /// Executes `msgs` as one block and commits it.
    ///
    /// A message failing with a recoverable error is rolled back on its own
    /// and reported in [`BlockOutcome::results`]. A fatal error aborts the
    /// whole block: nothing is committed and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns the first fatal [`RegistryError`] raised by a message, or
    /// [`RegistryError::Store`] if persisting the block fails.
    pub async fn execute_block(&self, msgs: Vec<Msg>) -> Result<BlockOutcome, RegistryError> {
        let _writer = self.writer.lock().await;
        let base = self.snapshot().await;
        let height = base.height.checked_add(1).ok_or(RegistryError::HeightOverflow)?;

        let mut block = CacheStore::new(base.store.as_ref());
        let mut results = Vec::with_capacity(msgs.len());
        for (index, msg) in msgs.into_iter().enumerate() {
            let name = msg.name();
            let mut tx = CacheStore::new(&block);
            match deliver(&mut tx, msg) {
                Ok(result) => {
                    let changes = tx.into_change_set();
                    block.absorb(changes);
                    results.push(Ok(result));
                }
                Err(e) if e.is_fatal() => {
                    tracing::error!(
                        height,
                        index,
                        msg = name,
                        error = %e,
                        "fatal error, aborting block"
                    );
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(height, index, msg = name, error = %e, "message rejected");
                    results.push(Err(e));
                }
            }
        }

        let changes = block.into_change_set();
        self.commit(base, height, changes).await?;
        tracing::info!(height, messages = results.len(), "block committed");

        Ok(BlockOutcome { height, results })
    }

    /// Runs [`execute_block`](Self::execute_block) on its own task.
    ///
    /// Dropping the returned handle does not cancel the block: once
    /// spawned, it either commits completely or not at all.
    pub fn spawn_block(
        self: &Arc<Self>,
        msgs: Vec<Msg>,
    ) -> JoinHandle<Result<BlockOutcome, RegistryError>> {
        let chain = Arc::clone(self);
        tokio::spawn(async move { chain.execute_block(msgs).await })
    }

    async fn commit(
        &self,
        base: Snapshot,
        height: u64,
        changes: ChangeSet,
    ) -> Result<(), RegistryError> {
        if let Some(persistence) = &self.persistence {
            persistence.commit(height, &changes).await?;
        }

        // Release our handle on the base so an unshared store is updated in
        // place instead of copied.
        drop(base);
        let mut committed = self.committed.write().await;
        Arc::make_mut(&mut committed.store).apply(&changes);
        committed.height = height;
        Ok(())
    }
}

fn deliver<S: KvStore>(store: S, msg: Msg) -> Result<TxResult, RegistryError> {
    let mut registry = PoolRegistry::new(store);
    match msg {
        Msg::CreatePool(new_pool) => {
            let pool_id = registry.create_pool(new_pool)?;
            tracing::info!(%pool_id, "pool created");
            Ok(TxResult::PoolCreated { pool_id })
        }
        Msg::UpdatePool(pool) => {
            registry.set_pool(&pool)?;
            Ok(TxResult::PoolUpdated { pool_id: pool.id })
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::pool::tests::new_pool;
    use crate::domain::{PoolId, pool_counter};
    use crate::store::{KvRead, StoreKey};
    use tokio_test::{assert_err, assert_ok};

    async fn genesis_chain(next: u64) -> ChainState {
        let chain = ChainState::in_memory();
        let genesis = GenesisState {
            next_pool_number: Some(next),
            ..GenesisState::default()
        };
        assert_ok!(chain.init_genesis(&genesis).await);
        chain
    }

    fn created(result: &Result<TxResult, RegistryError>) -> PoolId {
        match result {
            Ok(TxResult::PoolCreated { pool_id }) => *pool_id,
            other => panic!("expected pool creation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn genesis_does_not_advance_height() {
        let chain = genesis_chain(0).await;
        assert_eq!(chain.height().await, 0);
        let snapshot = chain.snapshot().await;
        assert_eq!(assert_ok!(snapshot.registry().next_pool_number()), 0);
    }

    #[tokio::test]
    async fn block_commits_all_messages() {
        let chain = genesis_chain(0).await;
        let outcome = assert_ok!(
            chain
                .execute_block(vec![
                    Msg::CreatePool(new_pool("uatom", "umtrx")),
                    Msg::CreatePool(new_pool("uosmo", "umtrx")),
                ])
                .await
        );
        assert_eq!(outcome.height, 1);
        let ids: Vec<PoolId> = outcome.results.iter().map(created).collect();
        assert_eq!(ids, vec![PoolId::new(0), PoolId::new(1)]);

        let snapshot = chain.snapshot().await;
        assert_eq!(snapshot.height, 1);
        assert_eq!(assert_ok!(snapshot.registry().next_pool_number()), 2);
    }

    #[tokio::test]
    async fn rejected_message_rolls_back_alone() {
        let chain = genesis_chain(0).await;
        let outcome = assert_ok!(
            chain
                .execute_block(vec![
                    Msg::CreatePool(new_pool("uatom", "umtrx")),
                    Msg::CreatePool(new_pool("uatom", "uatom")),
                    Msg::CreatePool(new_pool("uosmo", "umtrx")),
                ])
                .await
        );
        let [first, second, third] = outcome.results.as_slice() else {
            panic!("expected three results");
        };
        assert_eq!(created(first), PoolId::new(0));
        assert!(matches!(second, Err(RegistryError::InvalidArgument(_))));
        // the rejected message consumed no id
        assert_eq!(created(third), PoolId::new(1));
    }

    #[tokio::test]
    async fn fatal_error_aborts_whole_block() {
        let chain = ChainState::in_memory();
        let err = assert_err!(
            chain
                .execute_block(vec![Msg::CreatePool(new_pool("uatom", "umtrx"))])
                .await
        );
        assert!(matches!(err, RegistryError::Uninitialized(_)));
        assert_eq!(chain.height().await, 0);
        assert!(chain.snapshot().await.store.is_empty());
    }

    #[tokio::test]
    async fn fatal_error_discards_earlier_messages() {
        let chain = genesis_chain(0).await;
        let outcome = assert_ok!(
            chain
                .execute_block(vec![Msg::CreatePool(new_pool("uatom", "umtrx"))])
                .await
        );
        let [first] = outcome.results.as_slice() else {
            panic!("expected one result");
        };
        let id = created(first);

        // Corrupt the counter so the next creation is fatal.
        let snapshot = chain.snapshot().await;
        let mut store = MemStore::clone(&snapshot.store);
        assert_ok!(store.set(&StoreKey::NextPoolNumber.encode(), &[1, 2, 3]));
        let corrupt = ChainState::new(store, snapshot.height, None);
        let before = corrupt.snapshot().await;

        let mut pool = assert_ok!(before.registry().get_pool(id));
        pool.params.swap_fee_bps = 50;
        let err = assert_err!(
            corrupt
                .execute_block(vec![
                    Msg::UpdatePool(pool),
                    Msg::CreatePool(new_pool("uosmo", "umtrx")),
                ])
                .await
        );
        assert!(matches!(err, RegistryError::CorruptedCounter { .. }));

        let after = corrupt.snapshot().await;
        assert_eq!(after.height, before.height);
        assert_eq!(after.store, before.store);
        assert_eq!(
            assert_ok!(after.registry().get_pool(id)).params.swap_fee_bps,
            30
        );
    }

    #[tokio::test]
    async fn update_pool_overwrites_committed_record() {
        let chain = genesis_chain(0).await;
        let outcome = assert_ok!(
            chain
                .execute_block(vec![Msg::CreatePool(new_pool("uatom", "umtrx"))])
                .await
        );
        let [first] = outcome.results.as_slice() else {
            panic!("expected one result");
        };
        let id = created(first);

        let mut pool = assert_ok!(chain.snapshot().await.registry().get_pool(id));
        if let Some(asset) = pool.assets.first_mut() {
            asset.token.amount += 500;
        }
        let outcome = assert_ok!(chain.execute_block(vec![Msg::UpdatePool(pool.clone())]).await);
        assert!(matches!(
            outcome.results.first(),
            Some(Ok(TxResult::PoolUpdated { pool_id })) if *pool_id == id
        ));
        assert_eq!(assert_ok!(chain.snapshot().await.registry().get_pool(id)), pool);
    }

    #[tokio::test]
    async fn held_snapshot_is_not_affected_by_later_blocks() {
        let chain = genesis_chain(0).await;
        let held = chain.snapshot().await;
        assert_ok!(
            chain
                .execute_block(vec![Msg::CreatePool(new_pool("uatom", "umtrx"))])
                .await
        );
        assert_eq!(assert_ok!(held.registry().next_pool_number()), 0);
        assert_eq!(assert_ok!(pool_counter::get(held.store.as_ref())), Some(0));
        assert_eq!(
            assert_ok!(chain.snapshot().await.registry().next_pool_number()),
            1
        );
        assert!(assert_ok!(held.store.get(&StoreKey::Pool(PoolId::new(0)).encode())).is_none());
    }

    #[tokio::test]
    async fn spawned_block_commits_after_caller_gives_up() {
        let chain = Arc::new(genesis_chain(0).await);
        let handle = chain.spawn_block(vec![Msg::CreatePool(new_pool("uatom", "umtrx"))]);
        drop(handle);

        let committed = tokio::time::timeout(std::time::Duration::from_secs(1), async {
            while chain.height().await == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await;
        assert_ok!(committed);

        let snapshot = chain.snapshot().await;
        assert_eq!(snapshot.height, 1);
        assert_eq!(assert_ok!(snapshot.registry().next_pool_number()), 1);
        assert_ok!(snapshot.registry().get_pool(PoolId::new(0)));
    }

    #[tokio::test]
    async fn spawned_block_reports_its_outcome() {
        let chain = Arc::new(genesis_chain(3).await);
        let joined = chain
            .spawn_block(vec![Msg::CreatePool(new_pool("uatom", "umtrx"))])
            .await;
        let outcome = assert_ok!(assert_ok!(joined));
        assert_eq!(outcome.height, 1);
        let [first] = outcome.results.as_slice() else {
            panic!("expected one result");
        };
        assert_eq!(created(first), PoolId::new(3));
    }

    #[tokio::test]
    async fn exhausted_height_is_fatal() {
        let mut store = MemStore::new();
        assert_ok!(PoolRegistry::new(&mut store).init_genesis(&GenesisState::default()));
        let chain = ChainState::new(store, u64::MAX, None);
        let err = assert_err!(chain.execute_block(Vec::new()).await);
        assert!(matches!(err, RegistryError::HeightOverflow));
        assert!(err.is_fatal());
        assert_eq!(chain.height().await, u64::MAX);
    }
}
