//! Query service: read-only facade over committed registry state.
//!
//! Every handler takes its request as an `Option` so that an absent request
//! is rejected with [`RegistryError::InvalidArgument`] instead of being
//! treated as a default. Reads always go against the latest committed
//! snapshot, never against a block in progress.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::chain::ChainState;
use crate::domain::{Params, Pool, PoolId};
use crate::error::{ErrorKind, RegistryError};

/// Request for the module parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct QueryParamsRequest {}

/// Module parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParamsResponse {
    /// Current parameters.
    pub params: Params,
}

/// Request for a single pool.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueryGetPoolRequest {
    /// Id of the pool to fetch.
    pub pool_id: PoolId,
}

/// A single pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryGetPoolResponse {
    /// The stored pool record.
    pub pool: Pool,
}

/// Request for the next pool number.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct QueryNextPoolNumberRequest {}

/// The id the next created pool will receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryNextPoolNumberResponse {
    /// Next pool id.
    pub pool_id: u64,
}

/// Request for a page of pools in id order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueryPoolsRequest {
    /// Number of pools to skip.
    pub offset: usize,
    /// Maximum number of pools to return.
    pub limit: usize,
}

/// A page of pools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPoolsResponse {
    /// Pools on this page, ascending by id.
    pub pools: Vec<Pool>,
    /// Total number of stored pools.
    pub total: usize,
}

/// Read-only query handlers over the registry.
#[derive(Debug, Clone)]
pub struct QueryService {
    chain: Arc<ChainState>,
}

impl QueryService {
    /// Creates a query service reading from `chain`'s committed state.
    #[must_use]
    pub fn new(chain: Arc<ChainState>) -> Self {
        Self { chain }
    }

    /// Returns the module parameters.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidArgument`] for an absent request and
    /// [`RegistryError::Uninitialized`] if genesis never ran.
    pub async fn params(
        &self,
        req: Option<&QueryParamsRequest>,
    ) -> Result<QueryParamsResponse, RegistryError> {
        require(req)?;
        let snapshot = self.chain.snapshot().await;
        let params = observe("params", snapshot.registry().params())?;
        Ok(QueryParamsResponse { params })
    }

    /// Returns the pool stored under the requested id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidArgument`] for an absent request,
    /// [`RegistryError::PoolNotFound`] for an unknown id and
    /// [`RegistryError::DataCorruption`] for an undecodable record.
    pub async fn pool(
        &self,
        req: Option<&QueryGetPoolRequest>,
    ) -> Result<QueryGetPoolResponse, RegistryError> {
        let req = require(req)?;
        let snapshot = self.chain.snapshot().await;
        let pool = observe("pool", snapshot.registry().get_pool(req.pool_id))?;
        Ok(QueryGetPoolResponse { pool })
    }

    /// Returns the id the next created pool will receive.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidArgument`] for an absent request and
    /// the fatal [`RegistryError::Uninitialized`] if genesis never wrote the
    /// counter.
    pub async fn next_pool_number(
        &self,
        req: Option<&QueryNextPoolNumberRequest>,
    ) -> Result<QueryNextPoolNumberResponse, RegistryError> {
        require(req)?;
        let snapshot = self.chain.snapshot().await;
        let pool_id = observe("next_pool_number", snapshot.registry().next_pool_number())?;
        Ok(QueryNextPoolNumberResponse { pool_id })
    }

    /// Returns a page of pools ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidArgument`] for an absent request and
    /// [`RegistryError::DataCorruption`] if a record on the page is
    /// undecodable.
    pub async fn pools(
        &self,
        req: Option<&QueryPoolsRequest>,
    ) -> Result<QueryPoolsResponse, RegistryError> {
        let req = require(req)?;
        let snapshot = self.chain.snapshot().await;
        let (pools, total) = observe(
            "pools",
            snapshot.registry().pools_page(req.offset, req.limit),
        )?;
        Ok(QueryPoolsResponse { pools, total })
    }
}

fn require<T>(req: Option<&T>) -> Result<&T, RegistryError> {
    req.ok_or_else(|| RegistryError::InvalidArgument("invalid request".to_string()))
}

/// Logs a failed lookup at a severity matching its kind.
fn observe<T>(query: &'static str, result: Result<T, RegistryError>) -> Result<T, RegistryError> {
    if let Err(e) = &result {
        match e.kind() {
            _ if e.is_fatal() => tracing::error!(query, error = %e, "query hit fatal registry state"),
            ErrorKind::DataCorruption => tracing::error!(query, error = %e, "corrupted record"),
            ErrorKind::NotFound => tracing::debug!(query, error = %e, "lookup miss"),
            _ => tracing::warn!(query, error = %e, "query failed"),
        }
    }
    result
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::chain::{Msg, TxResult};
    use crate::domain::GenesisState;
    use crate::domain::pool::tests::new_pool;
    use crate::store::{KvStore, MemStore, StoreKey};
    use tokio_test::{assert_err, assert_ok};

    async fn service_at(next: u64) -> (QueryService, Arc<ChainState>) {
        let chain = Arc::new(ChainState::in_memory());
        let genesis = GenesisState {
            next_pool_number: Some(next),
            ..GenesisState::default()
        };
        assert_ok!(chain.init_genesis(&genesis).await);
        (QueryService::new(Arc::clone(&chain)), chain)
    }

    async fn create(chain: &ChainState, a: &str, b: &str) -> PoolId {
        let outcome = assert_ok!(
            chain
                .execute_block(vec![Msg::CreatePool(new_pool(a, b))])
                .await
        );
        match outcome.results.first() {
            Some(Ok(TxResult::PoolCreated { pool_id })) => *pool_id,
            other => panic!("expected pool creation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn absent_requests_are_invalid_arguments() {
        let (service, _) = service_at(0).await;

        let err = assert_err!(service.params(None).await);
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = assert_err!(service.pool(None).await);
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = assert_err!(service.next_pool_number(None).await);
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = assert_err!(service.pools(None).await);
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn absent_request_is_rejected_even_before_genesis() {
        let service = QueryService::new(Arc::new(ChainState::in_memory()));
        let err = assert_err!(service.next_pool_number(None).await);
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn scenario_from_zero() {
        let (service, chain) = service_at(0).await;
        let a = create(&chain, "uatom", "umtrx").await;
        let b = create(&chain, "uosmo", "umtrx").await;
        assert_eq!((a.get(), b.get()), (0, 1));

        let next = assert_ok!(
            service
                .next_pool_number(Some(&QueryNextPoolNumberRequest {}))
                .await
        );
        assert_eq!(next.pool_id, 2);

        let got = assert_ok!(
            service
                .pool(Some(&QueryGetPoolRequest { pool_id: a }))
                .await
        );
        assert_eq!(got.pool.assets, new_pool("uatom", "umtrx").assets);

        let err = assert_err!(
            service
                .pool(Some(&QueryGetPoolRequest {
                    pool_id: PoolId::new(5)
                }))
                .await
        );
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn next_pool_number_tracks_creations() {
        let (service, chain) = service_at(10).await;
        for i in 0..4u64 {
            create(&chain, &format!("u{i}"), "umtrx").await;
        }
        let next = assert_ok!(
            service
                .next_pool_number(Some(&QueryNextPoolNumberRequest {}))
                .await
        );
        assert_eq!(next.pool_id, 14);
    }

    #[tokio::test]
    async fn queries_before_genesis_are_fatal() {
        let service = QueryService::new(Arc::new(ChainState::in_memory()));
        let err = assert_err!(
            service
                .next_pool_number(Some(&QueryNextPoolNumberRequest {}))
                .await
        );
        assert_eq!(err.kind(), ErrorKind::Uninitialized);
        assert!(err.is_fatal());

        let err = assert_err!(service.params(Some(&QueryParamsRequest {})).await);
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn params_returns_genesis_params() {
        let (service, _) = service_at(0).await;
        let resp = assert_ok!(service.params(Some(&QueryParamsRequest {})).await);
        assert_eq!(resp.params, Params::default());
    }

    #[tokio::test]
    async fn corrupted_pool_is_reported_not_fatal() {
        let mut store = MemStore::new();
        {
            let mut registry = crate::domain::PoolRegistry::new(&mut store);
            assert_ok!(registry.init_genesis(&GenesisState::default()));
        }
        assert_ok!(store.set(&StoreKey::Pool(PoolId::new(0)).encode(), b"garbage"));
        let service = QueryService::new(Arc::new(ChainState::new(store, 0, None)));

        let err = assert_err!(
            service
                .pool(Some(&QueryGetPoolRequest {
                    pool_id: PoolId::new(0)
                }))
                .await
        );
        assert_eq!(err.kind(), ErrorKind::DataCorruption);
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn pools_pages_in_order() {
        let (service, chain) = service_at(0).await;
        for i in 0..3u64 {
            create(&chain, &format!("u{i}"), "umtrx").await;
        }
        let page = assert_ok!(
            service
                .pools(Some(&QueryPoolsRequest {
                    offset: 1,
                    limit: 5
                }))
                .await
        );
        assert_eq!(page.total, 3);
        let ids: Vec<u64> = page.pools.iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
