//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Coin;
use crate::error::GatewayError;

/// A token amount. The amount is a decimal string to keep `u128` precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CoinDto {
    /// Token denomination (e.g. `"umtrx"`).
    pub denom: String,
    /// Amount as a base-10 string.
    #[schema(example = "1000000")]
    pub amount: String,
}

impl From<&Coin> for CoinDto {
    fn from(coin: &Coin) -> Self {
        Self {
            denom: coin.denom.clone(),
            amount: coin.amount.to_string(),
        }
    }
}

impl CoinDto {
    /// Parses the DTO back into a [`Coin`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the amount is not a
    /// base-10 `u128`.
    pub fn to_coin(&self) -> Result<Coin, GatewayError> {
        Ok(Coin::new(
            self.denom.clone(),
            parse_u128(&self.amount, "amount")?,
        ))
    }
}

/// Parses a decimal string field into a `u128`.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] naming `field` on failure.
pub fn parse_u128(value: &str, field: &str) -> Result<u128, GatewayError> {
    value
        .parse()
        .map_err(|e| GatewayError::InvalidRequest(format!("invalid {field} {value:?}: {e}")))
}

/// Pagination query parameters for list endpoints.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl PaginationParams {
    /// Clamps `page` to at least 1 and `per_page` to `1..=100`.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, 100),
        }
    }

    /// Number of items preceding this page.
    #[must_use]
    pub fn offset(&self) -> usize {
        let skipped = u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page);
        usize::try_from(skipped).unwrap_or(usize::MAX)
    }

    /// Builds the response metadata for `total` items.
    #[must_use]
    pub fn meta(&self, total: usize) -> PaginationMeta {
        let total = u32::try_from(total).unwrap_or(u32::MAX);
        PaginationMeta {
            page: self.page,
            per_page: self.per_page,
            total,
            total_pages: total.div_ceil(self.per_page.max(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamping_and_offset() {
        let params = PaginationParams {
            page: 0,
            per_page: 500,
        }
        .clamped();
        assert_eq!((params.page, params.per_page), (1, 100));
        assert_eq!(params.offset(), 0);

        let params = PaginationParams {
            page: 3,
            per_page: 20,
        };
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn meta_counts_pages() {
        let params = PaginationParams {
            page: 1,
            per_page: 20,
        };
        let meta = params.meta(41);
        assert_eq!((meta.total, meta.total_pages), (41, 3));
        assert_eq!(params.meta(0).total_pages, 0);
    }

    #[test]
    fn coin_amounts_are_strings() {
        let dto = CoinDto::from(&Coin::new("umtrx", u128::MAX));
        assert_eq!(dto.amount, u128::MAX.to_string());
        assert!(matches!(dto.to_coin(), Ok(coin) if coin.amount == u128::MAX));

        let bad = CoinDto {
            denom: "umtrx".to_string(),
            amount: "-1".to_string(),
        };
        assert!(matches!(bad.to_coin(), Err(GatewayError::InvalidRequest(_))));
    }
}
