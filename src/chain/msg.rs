//! State-transition messages accepted by the host.

use serde::{Deserialize, Serialize};

use crate::domain::{NewPool, Pool, PoolId};

/// A write-path message executed inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Msg {
    /// Create a pool; the registry assigns its id.
    CreatePool(NewPool),
    /// Overwrite an existing pool's record.
    UpdatePool(Pool),
}

impl Msg {
    /// Short message name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreatePool(_) => "create_pool",
            Self::UpdatePool(_) => "update_pool",
        }
    }
}

/// Result of a successfully delivered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TxResult {
    /// A pool was created under the given id.
    PoolCreated {
        /// Assigned pool id.
        pool_id: PoolId,
    },
    /// The pool with the given id was overwritten.
    PoolUpdated {
        /// Updated pool id.
        pool_id: PoolId,
    },
}
