//! Insight feed endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use tracing::info;
use uuid::Uuid;

use fincanvas_core::Insight;

use crate::error::ApiResult;
use crate::models::{ApiResponse, GenerateInsightRequest, UnreadCount};
use crate::AppState;

/// GET /api/v1/insights
pub async fn get_recent(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ApiResponse<Vec<Insight>>>> {
    let insights = state.insights.recent().await?;
    Ok(Json(ApiResponse::success(insights)))
}

/// GET /api/v1/insights/unread-count
pub async fn get_unread_count(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ApiResponse<UnreadCount>>> {
    let unread = state.insights.unread_count().await?;
    Ok(Json(ApiResponse::success(UnreadCount { unread })))
}

/// POST /api/v1/insights
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateInsightRequest>,
) -> ApiResult<Json<ApiResponse<Insight>>> {
    let insight = state.insights.generate(request).await?;
    Ok(Json(ApiResponse::success(insight)))
}

/// POST /api/v1/insights/:id/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Insight>>> {
    let insight = state.insights.mark_read(id).await?;
    info!(insight_id = %id, "insight marked read");
    Ok(Json(ApiResponse::success(insight)))
}
