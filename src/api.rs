//! JSON endpoints used by the site's front-end scripts: product
//! autocomplete and the category tree.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::services::ServiceError;
use crate::web::AppState;
use catalog::TreeNode;

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
}

/// A product match trimmed to what the autocomplete dropdown renders.
#[derive(Debug, Serialize)]
struct ProductHit {
    id: i64,
    name: String,
    sku: String,
    slug: String,
}

fn http_error(err: ServiceError) -> (StatusCode, String) {
    if err.is_not_found() {
        (StatusCode::NOT_FOUND, err.to_string())
    } else {
        tracing::error!("API request failed: {}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

/// Autocomplete over product name and SKU. Queries under two characters
/// return an empty list rather than scanning the whole table.
async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ProductHit>>, (StatusCode, String)> {
    let query = params.q.unwrap_or_default();
    let query = query.trim();
    if query.len() < 2 {
        return Ok(Json(Vec::new()));
    }

    let hits = state
        .db
        .search_products_brief(query, 10)
        .await
        .map_err(ServiceError::from)
        .map_err(http_error)?
        .into_iter()
        .map(|row| ProductHit {
            id: row.id,
            name: row.name,
            sku: row.sku,
            slug: row.slug,
        })
        .collect();
    Ok(Json(hits))
}

/// The active category tree, roots first, children sorted.
async fn categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<TreeNode>>, (StatusCode, String)> {
    let forest = state.catalog.category_forest().await.map_err(http_error)?;
    Ok(Json(forest))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products/search", get(search_products))
        .route("/categories", get(categories))
}
