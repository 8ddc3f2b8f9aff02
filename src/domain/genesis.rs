//! Genesis state: the registry contents written before the first block.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::pool::validate_pool;
use super::{Params, Pool};
use crate::error::RegistryError;

/// Initial (or exported) registry state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    /// Module parameters.
    #[serde(default)]
    pub params: Params,
    /// Counter value to start from. Falls back to
    /// [`Params::starting_pool_number`] when absent.
    #[serde(default)]
    pub next_pool_number: Option<u64>,
    /// Pools carried over from an exported state.
    #[serde(default)]
    pub pools: Vec<Pool>,
}

impl GenesisState {
    /// Returns the counter value genesis will write.
    #[must_use]
    pub fn next_pool_number(&self) -> u64 {
        self.next_pool_number
            .unwrap_or(self.params.starting_pool_number)
    }

    /// Checks params and imported pools.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidGenesis`] when params are invalid, a
    /// pool id repeats or is not below the counter, or a pool is malformed.
    pub fn validate(&self) -> Result<(), RegistryError> {
        self.params.validate()?;

        let next = self.next_pool_number();
        let mut seen = HashSet::with_capacity(self.pools.len());
        for pool in &self.pools {
            if !seen.insert(pool.id) {
                return Err(RegistryError::InvalidGenesis(format!(
                    "duplicate pool id {}",
                    pool.id
                )));
            }
            if pool.id.get() >= next {
                return Err(RegistryError::InvalidGenesis(format!(
                    "pool id {} is not below next pool number {next}",
                    pool.id
                )));
            }
            validate_pool(pool)
                .map_err(|e| RegistryError::InvalidGenesis(format!("pool {}: {e}", pool.id)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::PoolId;
    use crate::domain::pool::tests::new_pool;
    use tokio_test::{assert_err, assert_ok};

    fn pool(id: u64) -> Pool {
        let Ok(pool) = new_pool("uatom", "umtrx").into_pool(PoolId::new(id)) else {
            panic!("valid pool");
        };
        pool
    }

    #[test]
    fn counter_defaults_to_starting_pool_number() {
        let genesis = GenesisState::default();
        assert_eq!(genesis.next_pool_number(), 1);

        let genesis = GenesisState {
            next_pool_number: Some(0),
            ..GenesisState::default()
        };
        assert_eq!(genesis.next_pool_number(), 0);
    }

    #[test]
    fn imported_pools_must_be_below_counter() {
        let genesis = GenesisState {
            next_pool_number: Some(3),
            pools: vec![pool(1), pool(2)],
            ..GenesisState::default()
        };
        assert_ok!(genesis.validate());

        let genesis = GenesisState {
            next_pool_number: Some(2),
            pools: vec![pool(2)],
            ..GenesisState::default()
        };
        assert_err!(genesis.validate());
    }

    #[test]
    fn duplicate_pool_ids_are_rejected() {
        let genesis = GenesisState {
            next_pool_number: Some(5),
            pools: vec![pool(1), pool(1)],
            ..GenesisState::default()
        };
        assert!(matches!(
            genesis.validate(),
            Err(RegistryError::InvalidGenesis(_))
        ));
    }

    #[test]
    fn parses_minimal_json() {
        let parsed: Result<GenesisState, _> =
            serde_json::from_str(r#"{"params":{"starting_pool_number":0,"pool_creation_fee":[]}}"#);
        let Ok(genesis) = parsed else {
            panic!("genesis json rejected");
        };
        assert_eq!(genesis.next_pool_number(), 0);
        assert!(genesis.pools.is_empty());
    }
}
