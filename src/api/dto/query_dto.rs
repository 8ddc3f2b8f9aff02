//! Response DTOs for the query endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::CoinDto;
use super::pool_dto::PoolDto;
use crate::service::{QueryGetPoolResponse, QueryNextPoolNumberResponse, QueryParamsResponse};

/// Module parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ParamsDto {
    /// Counter value applied at genesis when none is given explicitly.
    pub starting_pool_number: u64,
    /// Fee charged for creating a pool.
    pub pool_creation_fee: Vec<CoinDto>,
    /// Denoms allowed in new pools; empty means unrestricted.
    pub whitelisted_assets: Vec<String>,
}

/// Response for `GetParams`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParamsResponse {
    /// Current parameters.
    pub params: ParamsDto,
}

impl From<QueryParamsResponse> for ParamsResponse {
    fn from(resp: QueryParamsResponse) -> Self {
        let params = resp.params;
        Self {
            params: ParamsDto {
                starting_pool_number: params.starting_pool_number,
                pool_creation_fee: params.pool_creation_fee.iter().map(CoinDto::from).collect(),
                whitelisted_assets: params.whitelisted_assets,
            },
        }
    }
}

/// Response for `GetPool`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PoolResponse {
    /// The stored pool.
    pub pool: PoolDto,
}

impl From<QueryGetPoolResponse> for PoolResponse {
    fn from(resp: QueryGetPoolResponse) -> Self {
        Self {
            pool: PoolDto::from(&resp.pool),
        }
    }
}

/// Response for `GetNextPoolNumber`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct NextPoolNumberResponse {
    /// Id the next created pool will receive.
    pub pool_id: u64,
}

impl From<QueryNextPoolNumberResponse> for NextPoolNumberResponse {
    fn from(resp: QueryNextPoolNumberResponse) -> Self {
        Self {
            pool_id: resp.pool_id,
        }
    }
}
