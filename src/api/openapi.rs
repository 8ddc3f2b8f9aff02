//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::handlers::{pool, query, system};

/// Generated OpenAPI description of every route.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "dex-registry",
        description = "Liquidity-pool registry with a read-only query gateway."
    ),
    paths(
        system::health_handler,
        query::get_params,
        query::get_next_pool_number,
        query::query_params,
        query::query_pool,
        query::query_next_pool_number,
        pool::create_pool,
        pool::list_pools,
        pool::get_pool,
    ),
    tags(
        (name = "System", description = "Service health"),
        (name = "Query", description = "Registry queries against committed state"),
        (name = "Pools", description = "Pool creation and listing"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/v1/params",
            "/api/v1/next-pool-number",
            "/api/v1/query/params",
            "/api/v1/query/pool",
            "/api/v1/query/next-pool-number",
            "/api/v1/pools",
            "/api/v1/pools/{pool_id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
