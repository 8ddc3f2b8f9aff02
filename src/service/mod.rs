//! Service layer: read-only query facade.
//!
//! [`QueryService`] translates query requests into registry lookups
//! against the latest committed snapshot held by [`crate::chain::ChainState`].

pub mod query_service;

pub use query_service::{
    QueryGetPoolRequest, QueryGetPoolResponse, QueryNextPoolNumberRequest,
    QueryNextPoolNumberResponse, QueryParamsRequest, QueryParamsResponse, QueryPoolsRequest,
    QueryPoolsResponse, QueryService,
};
