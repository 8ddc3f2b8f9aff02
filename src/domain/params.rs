//! Module parameters returned by the `GetParams` query.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::Coin;
use crate::error::RegistryError;

/// Denomination of the default pool creation fee.
pub const DEFAULT_FEE_DENOM: &str = "umtrx";

/// Module configuration, written at genesis and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Counter value written at genesis when none is given explicitly.
    pub starting_pool_number: u64,
    /// Fee charged by the write path for creating a pool.
    pub pool_creation_fee: Vec<Coin>,
    /// Denominations allowed in pools. Empty means no restriction.
    #[serde(default)]
    pub whitelisted_assets: Vec<String>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            starting_pool_number: 1,
            pool_creation_fee: vec![Coin::new(DEFAULT_FEE_DENOM, 1_000_000_000)],
            whitelisted_assets: Vec::new(),
        }
    }
}

impl Params {
    /// Checks the parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidGenesis`] if a fee denom is empty or
    /// repeated, or a whitelisted asset is empty or repeated.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let mut fee_denoms = HashSet::new();
        for coin in &self.pool_creation_fee {
            if coin.denom.is_empty() {
                return Err(RegistryError::InvalidGenesis(
                    "pool creation fee denom must not be empty".to_string(),
                ));
            }
            if !fee_denoms.insert(coin.denom.as_str()) {
                return Err(RegistryError::InvalidGenesis(format!(
                    "duplicate pool creation fee denom: {}",
                    coin.denom
                )));
            }
        }

        let mut assets = HashSet::new();
        for denom in &self.whitelisted_assets {
            if denom.is_empty() || !assets.insert(denom.as_str()) {
                return Err(RegistryError::InvalidGenesis(format!(
                    "invalid or duplicate whitelisted asset: {denom:?}"
                )));
            }
        }
        Ok(())
    }

    /// Returns `true` if `denom` may be placed in a pool.
    #[must_use]
    pub fn is_whitelisted(&self, denom: &str) -> bool {
        self.whitelisted_assets.is_empty() || self.whitelisted_assets.iter().any(|d| d == denom)
    }
}
