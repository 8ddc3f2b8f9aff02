//! Pool handlers: create, list, get.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    CreatePoolRequest, CreatePoolResponse, PaginationParams, PoolDto, PoolListResponse,
};
use crate::app_state::AppState;
use crate::chain::{Msg, TxResult};
use crate::domain::PoolId;
use crate::error::{ErrorResponse, GatewayError};
use crate::service::{QueryGetPoolRequest, QueryPoolsRequest};

/// `POST /pools`: Create a pool in a one-message block.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] if the payload is rejected by
/// the registry, or a 500 error (halting the node) on fatal state.
#[utoipa::path(
    post,
    path = "/api/v1/pools",
    tag = "Pools",
    summary = "Create a pool",
    description = "Submits a CreatePool message as its own block. The registry assigns the next pool id.",
    request_body = CreatePoolRequest,
    responses(
        (status = 201, description = "Pool created", body = CreatePoolResponse),
        (status = 400, description = "Invalid pool payload", body = ErrorResponse),
        (status = 500, description = "Registry failure", body = ErrorResponse),
    )
)]
pub async fn create_pool(
    State(state): State<AppState>,
    Json(req): Json<CreatePoolRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    state.ensure_running()?;
    let new_pool = req.into_new_pool()?;

    // A client disconnect drops this future; the spawned block still runs
    // to completion so the committed height and store never diverge.
    let outcome = state
        .chain
        .spawn_block(vec![Msg::CreatePool(new_pool)])
        .await
        .map_err(|e| GatewayError::Internal(format!("block task failed: {e}")))?
        .map_err(|e| state.escalate(e))?;

    match outcome.results.into_iter().next() {
        Some(Ok(TxResult::PoolCreated { pool_id })) => Ok((
            StatusCode::CREATED,
            Json(CreatePoolResponse {
                pool_id: pool_id.get(),
                height: outcome.height,
            }),
        )),
        Some(Err(e)) => Err(state.escalate(e)),
        other => Err(GatewayError::Internal(format!(
            "unexpected block result: {other:?}"
        ))),
    }
}

/// `GET /pools`: List pools in id order.
///
/// # Errors
///
/// Returns [`GatewayError::DataCorruption`] if a record on the page cannot
/// be decoded.
#[utoipa::path(
    get,
    path = "/api/v1/pools",
    tag = "Pools",
    summary = "List pools",
    description = "Returns a paginated list of pools ordered by id.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated pool list", body = PoolListResponse),
        (status = 500, description = "Corrupted record", body = ErrorResponse),
    )
)]
pub async fn list_pools(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let params = params.clamped();
    let page = state
        .query_service
        .pools(Some(&QueryPoolsRequest {
            offset: params.offset(),
            limit: params.per_page as usize,
        }))
        .await
        .map_err(|e| state.escalate(e))?;

    Ok(Json(PoolListResponse {
        data: page.pools.iter().map(PoolDto::from).collect(),
        pagination: params.meta(page.total),
    }))
}

/// `GET /pools/{pool_id}`: Get a single pool.
///
/// # Errors
///
/// Returns [`GatewayError::PoolNotFound`] if the pool does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/pools/{pool_id}",
    tag = "Pools",
    summary = "Get pool",
    params(
        ("pool_id" = u64, Path, description = "Pool id"),
    ),
    responses(
        (status = 200, description = "Pool record", body = PoolDto),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 500, description = "Corrupted record", body = ErrorResponse),
    )
)]
pub async fn get_pool(
    State(state): State<AppState>,
    Path(pool_id): Path<u64>,
) -> Result<impl IntoResponse, GatewayError> {
    let resp = state
        .query_service
        .pool(Some(&QueryGetPoolRequest {
            pool_id: PoolId::new(pool_id),
        }))
        .await
        .map_err(|e| state.escalate(e))?;
    Ok(Json(PoolDto::from(&resp.pool)))
}

/// Pool routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools", post(create_pool).get(list_pools))
        .route("/pools/{pool_id}", get(get_pool))
}
