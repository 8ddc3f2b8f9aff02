//! Query handlers: params, single pool lookup, and the next pool number.
//!
//! The `GET` routes are conveniences that always send a request. The
//! `POST /query/*` routes take the request as a JSON body which may be
//! `null` or missing, mirroring the query service contract. Bodies are read
//! as raw bytes so that a missing content type or malformed JSON is answered
//! with the same structured error as any other invalid request.

use axum::body::Bytes;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;

use crate::api::dto::{NextPoolNumberResponse, ParamsResponse, PoolResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};
use crate::service::{QueryGetPoolRequest, QueryNextPoolNumberRequest, QueryParamsRequest};

/// `GET /params`: Module parameters.
///
/// # Errors
///
/// Returns [`GatewayError::Uninitialized`] if genesis never ran.
#[utoipa::path(
    get,
    path = "/api/v1/params",
    tag = "Query",
    summary = "Get module parameters",
    responses(
        (status = 200, description = "Current parameters", body = ParamsResponse),
        (status = 500, description = "Registry not initialized", body = ErrorResponse),
    )
)]
pub async fn get_params(State(state): State<AppState>) -> Result<impl IntoResponse, GatewayError> {
    params(&state, Some(&QueryParamsRequest {})).await
}

/// `GET /next-pool-number`: Id the next created pool will receive.
///
/// # Errors
///
/// Returns [`GatewayError::Uninitialized`] and halts the node if the
/// counter was never written.
#[utoipa::path(
    get,
    path = "/api/v1/next-pool-number",
    tag = "Query",
    summary = "Get the next pool number",
    responses(
        (status = 200, description = "Next pool id", body = NextPoolNumberResponse),
        (status = 500, description = "Registry not initialized", body = ErrorResponse),
    )
)]
pub async fn get_next_pool_number(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, GatewayError> {
    next_pool_number(&state, Some(&QueryNextPoolNumberRequest {})).await
}

/// `POST /query/params`: `GetParams` with an explicit request body.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for a `null` body.
#[utoipa::path(
    post,
    path = "/api/v1/query/params",
    tag = "Query",
    summary = "GetParams",
    description = "A missing or `null` body is rejected as an invalid request.",
    request_body = QueryParamsRequest,
    responses(
        (status = 200, description = "Current parameters", body = ParamsResponse),
        (status = 400, description = "Missing request", body = ErrorResponse),
        (status = 500, description = "Registry not initialized", body = ErrorResponse),
    )
)]
pub async fn query_params(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ParamsResponse>, GatewayError> {
    let req = parse_request::<QueryParamsRequest>(&body)?;
    params(&state, req.as_ref()).await
}

/// `POST /query/pool`: `GetPool` with an explicit request body.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for a `null` body,
/// [`GatewayError::PoolNotFound`] for an unknown id and
/// [`GatewayError::DataCorruption`] for an undecodable record.
#[utoipa::path(
    post,
    path = "/api/v1/query/pool",
    tag = "Query",
    summary = "GetPool",
    description = "A missing or `null` body is rejected as an invalid request.",
    request_body = QueryGetPoolRequest,
    responses(
        (status = 200, description = "Stored pool", body = PoolResponse),
        (status = 400, description = "Missing request", body = ErrorResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 500, description = "Corrupted record", body = ErrorResponse),
    )
)]
pub async fn query_pool(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PoolResponse>, GatewayError> {
    let req = parse_request::<QueryGetPoolRequest>(&body)?;
    let resp = state
        .query_service
        .pool(req.as_ref())
        .await
        .map_err(|e| state.escalate(e))?;
    Ok(Json(PoolResponse::from(resp)))
}

/// `POST /query/next-pool-number`: `GetNextPoolNumber` with an explicit
/// request body.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for a `null` body and
/// [`GatewayError::Uninitialized`] if the counter was never written.
#[utoipa::path(
    post,
    path = "/api/v1/query/next-pool-number",
    tag = "Query",
    summary = "GetNextPoolNumber",
    description = "A missing or `null` body is rejected as an invalid request.",
    request_body = QueryNextPoolNumberRequest,
    responses(
        (status = 200, description = "Next pool id", body = NextPoolNumberResponse),
        (status = 400, description = "Missing request", body = ErrorResponse),
        (status = 500, description = "Registry not initialized", body = ErrorResponse),
    )
)]
pub async fn query_next_pool_number(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<NextPoolNumberResponse>, GatewayError> {
    let req = parse_request::<QueryNextPoolNumberRequest>(&body)?;
    next_pool_number(&state, req.as_ref()).await
}

async fn params(
    state: &AppState,
    req: Option<&QueryParamsRequest>,
) -> Result<Json<ParamsResponse>, GatewayError> {
    let resp = state
        .query_service
        .params(req)
        .await
        .map_err(|e| state.escalate(e))?;
    Ok(Json(ParamsResponse::from(resp)))
}

async fn next_pool_number(
    state: &AppState,
    req: Option<&QueryNextPoolNumberRequest>,
) -> Result<Json<NextPoolNumberResponse>, GatewayError> {
    let resp = state
        .query_service
        .next_pool_number(req)
        .await
        .map_err(|e| state.escalate(e))?;
    Ok(Json(NextPoolNumberResponse::from(resp)))
}

/// Decodes an optional JSON request body.
///
/// An empty body and a literal `null` both yield `None`, which the query
/// service rejects as an invalid argument.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] if the body is not valid JSON
/// for `T`.
fn parse_request<T: DeserializeOwned>(body: &[u8]) -> Result<Option<T>, GatewayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map_err(|e| GatewayError::InvalidRequest(format!("malformed request body: {e}")))
}

/// Query routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/params", get(get_params))
        .route("/next-pool-number", get(get_next_pool_number))
        .route("/query/params", post(query_params))
        .route("/query/pool", post(query_pool))
        .route("/query/next-pool-number", post(query_next_pool_number))
}
