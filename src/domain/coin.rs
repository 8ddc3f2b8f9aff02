//! Denominated token amount.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An amount of a single denomination, e.g. `1000000umtrx`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    /// Denomination name.
    pub denom: String,
    /// Amount in the denomination's smallest unit.
    pub amount: u128,
}

impl Coin {
    /// Creates a coin.
    #[must_use]
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}
