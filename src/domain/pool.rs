//! Pool entity and its creation payload.
//!
//! The economic fields are carried verbatim: the registry validates their
//! shape on creation but never prices, swaps or rebalances anything.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Coin, PoolId};
use crate::error::RegistryError;

/// Shares minted to the creator of a new pool: 100 * 10^18.
pub const INIT_POOL_SHARES: u128 = 100_000_000_000_000_000_000;

/// Minimum number of assets in a pool.
pub const MIN_POOL_ASSETS: usize = 2;

/// Maximum number of assets in a pool.
pub const MAX_POOL_ASSETS: usize = 8;

/// Upper bound for any fee expressed in basis points (100%).
pub const MAX_FEE_BPS: u32 = 10_000;

/// Fee settings fixed at pool creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolParams {
    /// Swap fee in basis points.
    pub swap_fee_bps: u32,
    /// Exit fee in basis points.
    pub exit_fee_bps: u32,
}

/// One token held by a pool together with its weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolAsset {
    /// Reserve of this token.
    pub token: Coin,
    /// Relative weight of this token in the pool.
    pub weight: u128,
}

/// A liquidity pool record as persisted in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    /// Unique pool identifier (immutable after creation).
    pub id: PoolId,
    /// Fee settings.
    pub params: PoolParams,
    /// Pool reserves and weights.
    pub assets: Vec<PoolAsset>,
    /// Sum of all asset weights.
    pub total_weight: u128,
    /// Outstanding pool shares, denominated `matrix/pool/{id}`.
    pub total_shares: Coin,
}

impl Pool {
    /// Returns the share denomination used by the pool with the given id.
    #[must_use]
    pub fn share_denom(id: PoolId) -> String {
        format!("matrix/pool/{id}")
    }
}

/// Payload used to create a pool; the registry assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPool {
    /// Fee settings.
    pub params: PoolParams,
    /// Initial reserves and weights.
    pub assets: Vec<PoolAsset>,
}

impl NewPool {
    /// Checks the payload shape.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidArgument`] when the asset count is
    /// out of range, a denom is empty or repeated, a weight or amount is zero,
    /// or a fee exceeds 100%.
    pub fn validate(&self) -> Result<(), RegistryError> {
        validate_shape(&self.params, &self.assets)
    }

    /// Builds the pool record that will be stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidArgument`] if the payload is invalid
    /// or the weights overflow when summed.
    pub fn into_pool(self, id: PoolId) -> Result<Pool, RegistryError> {
        self.validate()?;
        let total_weight = total_weight(&self.assets)?;
        Ok(Pool {
            id,
            params: self.params,
            assets: self.assets,
            total_weight,
            total_shares: Coin::new(Pool::share_denom(id), INIT_POOL_SHARES),
        })
    }
}

/// Validates an updated pool before it overwrites the stored one.
///
/// # Errors
///
/// Returns [`RegistryError::InvalidArgument`] on the same shape violations
/// as [`NewPool::validate`], or when `total_weight` disagrees with the assets.
pub fn validate_pool(pool: &Pool) -> Result<(), RegistryError> {
    validate_shape(&pool.params, &pool.assets)?;
    if total_weight(&pool.assets)? != pool.total_weight {
        return Err(RegistryError::InvalidArgument(format!(
            "pool {} total weight does not match its assets",
            pool.id
        )));
    }
    Ok(())
}

fn validate_shape(params: &PoolParams, assets: &[PoolAsset]) -> Result<(), RegistryError> {
    if !(MIN_POOL_ASSETS..=MAX_POOL_ASSETS).contains(&assets.len()) {
        return Err(RegistryError::InvalidArgument(format!(
            "pool must hold between {MIN_POOL_ASSETS} and {MAX_POOL_ASSETS} assets, got {}",
            assets.len()
        )));
    }
    if params.swap_fee_bps > MAX_FEE_BPS || params.exit_fee_bps > MAX_FEE_BPS {
        return Err(RegistryError::InvalidArgument(format!(
            "fees must not exceed {MAX_FEE_BPS} bps"
        )));
    }

    let mut seen = HashSet::with_capacity(assets.len());
    for asset in assets {
        if asset.token.denom.is_empty() {
            return Err(RegistryError::InvalidArgument(
                "asset denom must not be empty".to_string(),
            ));
        }
        if !seen.insert(asset.token.denom.as_str()) {
            return Err(RegistryError::InvalidArgument(format!(
                "duplicate asset denom: {}",
                asset.token.denom
            )));
        }
        if asset.weight == 0 {
            return Err(RegistryError::InvalidArgument(format!(
                "weight of {} must be positive",
                asset.token.denom
            )));
        }
        if asset.token.amount == 0 {
            return Err(RegistryError::InvalidArgument(format!(
                "reserve of {} must be positive",
                asset.token.denom
            )));
        }
    }
    Ok(())
}

fn total_weight(assets: &[PoolAsset]) -> Result<u128, RegistryError> {
    assets.iter().try_fold(0u128, |acc, asset| {
        acc.checked_add(asset.weight)
            .ok_or_else(|| RegistryError::InvalidArgument("total weight overflows".to_string()))
    })
}
