//! Demo data seeding endpoints, called once on first dashboard load.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::error::ApiResult;
use crate::models::{ApiResponse, SeedOutcome};
use crate::services::SeedService;
use crate::AppState;

/// POST /api/v1/seed/market
pub async fn seed_market(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ApiResponse<SeedOutcome>>> {
    let outcome = state.seed.seed_market().await?;
    Ok(Json(ApiResponse::success(SeedService::outcome(outcome))))
}

/// POST /api/v1/seed/portfolio
pub async fn seed_portfolio(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ApiResponse<SeedOutcome>>> {
    let outcome = state.seed.seed_portfolio().await?;
    Ok(Json(ApiResponse::success(SeedService::outcome(outcome))))
}
