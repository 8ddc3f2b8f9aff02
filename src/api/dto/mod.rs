//! Data Transfer Objects for REST request/response serialization.
//!
//! All `u128` amounts and weights are serialized as JSON strings to prevent
//! precision loss in clients.

pub mod common_dto;
pub mod pool_dto;
pub mod query_dto;

pub use common_dto::*;
pub use pool_dto::*;
pub use query_dto::*;
