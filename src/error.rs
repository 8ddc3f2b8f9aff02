//! Registry and gateway error types.
//!
//! [`RegistryError`] is raised by the storage-backed registry and the state
//! machine host. [`GatewayError`] is its HTTP-facing counterpart: each variant
//! maps to a status code and a structured JSON error body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::PoolId;
use crate::store::{CodecError, StoreError, StoreKey};

/// Coarse classification of a [`RegistryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent a missing or malformed request.
    InvalidArgument,
    /// The requested record does not exist.
    NotFound,
    /// A stored record exists but cannot be decoded.
    DataCorruption,
    /// Genesis did not write a mandatory singleton.
    Uninitialized,
    /// The storage backend failed.
    Store,
    /// The pool id space is exhausted.
    Overflow,
    /// A value could not be encoded.
    Internal,
}

/// Error raised by the registry, the query service and the host.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The request was absent or its content invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The genesis state or parameter set is invalid.
    #[error("invalid genesis: {0}")]
    InvalidGenesis(String),

    /// No pool is stored under the given id.
    #[error("pool {0} not found")]
    PoolNotFound(PoolId),

    /// A pool or params record is present but undecodable.
    #[error("corrupted record at key {key}: {source}")]
    DataCorruption {
        /// Key of the corrupted record.
        key: StoreKey,
        /// Decoding failure.
        #[source]
        source: CodecError,
    },

    /// The next pool number is present but malformed.
    #[error("corrupted next pool number at key {key}: {source}")]
    CorruptedCounter {
        /// Key of the counter.
        key: StoreKey,
        /// Decoding failure.
        #[source]
        source: CodecError,
    },

    /// A mandatory singleton has not been written by genesis.
    #[error("{0} has not been initialized; genesis must run first")]
    Uninitialized(&'static str),

    /// The counter cannot be advanced past `u64::MAX`.
    #[error("pool id space exhausted")]
    CounterOverflow,

    /// The block height cannot be advanced past `u64::MAX`.
    #[error("block height exhausted")]
    HeightOverflow,

    /// A record could not be encoded.
    #[error("failed to encode record for key {key}: {source}")]
    Encode {
        /// Key the record was destined for.
        key: StoreKey,
        /// Encoding failure.
        #[source]
        source: CodecError,
    },

    /// The storage backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegistryError {
    /// Returns the coarse classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) | Self::InvalidGenesis(_) => ErrorKind::InvalidArgument,
            Self::PoolNotFound(_) => ErrorKind::NotFound,
            Self::DataCorruption { .. } | Self::CorruptedCounter { .. } => {
                ErrorKind::DataCorruption
            }
            Self::Uninitialized(_) => ErrorKind::Uninitialized,
            Self::CounterOverflow | Self::HeightOverflow => ErrorKind::Overflow,
            Self::Encode { .. } => ErrorKind::Internal,
            Self::Store(_) => ErrorKind::Store,
        }
    }

    /// Returns `true` if the error must abort the current block and halt
    /// the node rather than be reported to the caller and forgotten.
    ///
    /// A corrupted pool record is not fatal at lookup time; a corrupted
    /// counter is, since no further pool can be created safely.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Uninitialized(_)
                | Self::CorruptedCounter { .. }
                | Self::CounterOverflow
                | Self::HeightOverflow
                | Self::Encode { .. }
                | Self::Store(_)
        )
    }
}

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "pool 5 not found",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request            |
/// | 2000–2999 | Not Found       | 404 Not Found              |
/// | 3000–3999 | Server          | 500 Internal Server Error  |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Pool with the given ID was not found.
    #[error("pool not found: {0}")]
    PoolNotFound(PoolId),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A stored record could not be decoded.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The registry was queried before genesis.
    #[error("registry not initialized: {0}")]
    Uninitialized(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::PoolNotFound(_) => 2001,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::DataCorruption(_) => 3002,
            Self::Uninitialized(_) => 3003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::PoolNotFound(_) => StatusCode::NOT_FOUND,
            Self::DataCorruption(_)
            | Self::Uninitialized(_)
            | Self::PersistenceError(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RegistryError> for GatewayError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::InvalidArgument(msg) => Self::InvalidRequest(msg),
            RegistryError::PoolNotFound(id) => Self::PoolNotFound(id),
            RegistryError::Store(e) => Self::PersistenceError(e.to_string()),
            other => match other.kind() {
                ErrorKind::InvalidArgument => Self::InvalidRequest(other.to_string()),
                ErrorKind::DataCorruption => Self::DataCorruption(other.to_string()),
                ErrorKind::Uninitialized => Self::Uninitialized(other.to_string()),
                _ => Self::Internal(other.to_string()),
            },
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
