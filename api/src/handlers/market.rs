//! Market data endpoints: indices, watchlist and per-symbol history.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;

use fincanvas_core::{MarketEntry, PriceBar};

use crate::error::ApiResult;
use crate::models::{ApiResponse, RangeQuery};
use crate::AppState;

/// GET /api/v1/market/indices
pub async fn get_indices(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ApiResponse<Vec<MarketEntry>>>> {
    let indices = state.market.indices().await;
    Ok(Json(ApiResponse::success(indices)))
}

/// GET /api/v1/market/watchlist
pub async fn get_watchlist(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ApiResponse<Vec<MarketEntry>>>> {
    let watchlist = state.market.watchlist().await;
    Ok(Json(ApiResponse::success(watchlist)))
}

/// GET /api/v1/market/:symbol/history?range=1D
pub async fn get_price_history(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<ApiResponse<Vec<PriceBar>>>> {
    let bars = state.market.price_history(&symbol, query.range).await;
    Ok(Json(ApiResponse::success(bars)))
}
