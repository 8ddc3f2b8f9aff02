//! Pool-related DTOs for create, get, and list operations.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::{CoinDto, PaginationMeta, parse_u128};
use crate::domain::{NewPool, Pool, PoolAsset, PoolParams};
use crate::error::GatewayError;

/// Fee configuration of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PoolParamsDto {
    /// Swap fee in basis points.
    pub swap_fee_bps: u32,
    /// Exit fee in basis points.
    pub exit_fee_bps: u32,
}

/// One weighted reserve of a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PoolAssetDto {
    /// Reserve held by the pool.
    pub token: CoinDto,
    /// Relative weight as a base-10 string.
    #[schema(example = "1")]
    pub weight: String,
}

impl From<&PoolAsset> for PoolAssetDto {
    fn from(asset: &PoolAsset) -> Self {
        Self {
            token: CoinDto::from(&asset.token),
            weight: asset.weight.to_string(),
        }
    }
}

/// Full pool record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PoolDto {
    /// Pool identifier.
    pub pool_id: u64,
    /// Fee configuration.
    pub params: PoolParamsDto,
    /// Weighted reserves.
    pub assets: Vec<PoolAssetDto>,
    /// Sum of asset weights.
    pub total_weight: String,
    /// Outstanding pool shares.
    pub total_shares: CoinDto,
}

impl From<&Pool> for PoolDto {
    fn from(pool: &Pool) -> Self {
        Self {
            pool_id: pool.id.get(),
            params: PoolParamsDto {
                swap_fee_bps: pool.params.swap_fee_bps,
                exit_fee_bps: pool.params.exit_fee_bps,
            },
            assets: pool.assets.iter().map(PoolAssetDto::from).collect(),
            total_weight: pool.total_weight.to_string(),
            total_shares: CoinDto::from(&pool.total_shares),
        }
    }
}

/// Request body for `POST /pools`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePoolRequest {
    /// Fee configuration.
    pub params: PoolParamsDto,
    /// Initial weighted reserves.
    pub assets: Vec<PoolAssetDto>,
}

impl CreatePoolRequest {
    /// Converts the request into a creation payload.
    ///
    /// Only string parsing happens here; pool-level validation runs inside
    /// the registry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if an amount or weight is
    /// not a base-10 `u128`.
    pub fn into_new_pool(self) -> Result<NewPool, GatewayError> {
        let assets = self
            .assets
            .iter()
            .map(|asset| {
                Ok(PoolAsset {
                    token: asset.token.to_coin()?,
                    weight: parse_u128(&asset.weight, "weight")?,
                })
            })
            .collect::<Result<Vec<_>, GatewayError>>()?;

        Ok(NewPool {
            params: PoolParams {
                swap_fee_bps: self.params.swap_fee_bps,
                exit_fee_bps: self.params.exit_fee_bps,
            },
            assets,
        })
    }
}

/// Response body for `POST /pools` (201 Created).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePoolResponse {
    /// Id assigned by the registry.
    pub pool_id: u64,
    /// Height of the block that created the pool.
    pub height: u64,
}

/// Paginated list response for `GET /pools`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolListResponse {
    /// Pools on this page, ascending by id.
    pub data: Vec<PoolDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
