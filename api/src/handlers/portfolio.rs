//! Portfolio endpoints: overview, positions, history and demo trades.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use tracing::info;

use fincanvas_core::{PortfolioPoint, Position};

use crate::error::ApiResult;
use crate::models::{
    ApiResponse, PlaceTradeRequest, PortfolioOverview, RangeQuery, TradeReceipt,
};
use crate::AppState;

/// GET /api/v1/portfolio
pub async fn get_overview(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ApiResponse<PortfolioOverview>>> {
    let overview = state.portfolio.overview().await?;
    Ok(Json(ApiResponse::success(overview)))
}

/// GET /api/v1/portfolio/positions
pub async fn get_positions(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ApiResponse<Vec<Position>>>> {
    let positions = state.portfolio.positions().await?;
    Ok(Json(ApiResponse::success(positions)))
}

/// GET /api/v1/portfolio/history?range=1M
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<ApiResponse<Vec<PortfolioPoint>>>> {
    let points = state.portfolio.history(query.range).await?;
    Ok(Json(ApiResponse::success(points)))
}

/// POST /api/v1/portfolio/trades
pub async fn place_trade(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlaceTradeRequest>,
) -> ApiResult<Json<ApiResponse<TradeReceipt>>> {
    let receipt = state.portfolio.place_trade(request).await?;
    info!(
        symbol = %receipt.symbol,
        side = %receipt.side,
        filled = receipt.filled_quantity,
        closed = receipt.closed,
        "demo trade settled"
    );
    Ok(Json(ApiResponse::success(receipt)))
}
