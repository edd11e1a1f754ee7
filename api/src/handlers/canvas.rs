//! Analysis canvas endpoints.
//!
//! The canvas lives server-side as a session state machine: the client
//! relays tool changes and pointer events, the server answers with the
//! outcome and serves full state snapshots.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use fincanvas_core::canvas::{
    suggest_symbols, AskReply, CanvasSession, PointerEvent, PointerOutcome, SymbolQuote,
};

use crate::error::{ApiError, ApiResult};
use crate::models::{
    AddTickerRequest, ApiResponse, AskRequest, CreateSessionRequest, PointerPhase, PointerRequest,
    SelectToolRequest, SessionCreated,
};
use crate::services::default_drop_point;
use crate::AppState;

fn session_not_found(id: Uuid) -> ApiError {
    ApiError::not_found(format!("Canvas session {id}"))
}

/// POST /api/v1/canvas/sessions
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateSessionRequest>,
) -> ApiResult<Json<ApiResponse<SessionCreated>>> {
    let session_id = state.canvas.create(request.symbol.as_deref())?;
    info!(session_id = %session_id, "canvas session created");
    Ok(Json(ApiResponse::success(SessionCreated { session_id })))
}

/// GET /api/v1/canvas/sessions/:id
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<CanvasSession>>> {
    let session = state.canvas.snapshot(id).ok_or_else(|| session_not_found(id))?;
    Ok(Json(ApiResponse::success(session)))
}

/// DELETE /api/v1/canvas/sessions/:id
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    if !state.canvas.remove(id) {
        return Err(session_not_found(id));
    }
    info!(session_id = %id, "canvas session deleted");
    Ok(Json(ApiResponse::success(())))
}

/// POST /api/v1/canvas/sessions/:id/tool
pub async fn select_tool(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectToolRequest>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state
        .canvas
        .with_session(id, |session| session.set_tool(request.tool))
        .ok_or_else(|| session_not_found(id))?;
    Ok(Json(ApiResponse::success(())))
}

/// POST /api/v1/canvas/sessions/:id/pointer
pub async fn pointer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<PointerRequest>,
) -> ApiResult<Json<ApiResponse<PointerOutcome>>> {
    let event = match request.phase {
        PointerPhase::Down => PointerEvent::Down(request.point().ok_or_else(|| {
            ApiError::validation("Pointer down requires x and y", Some("x"))
        })?),
        PointerPhase::Move => PointerEvent::Move(request.point().ok_or_else(|| {
            ApiError::validation("Pointer move requires x and y", Some("x"))
        })?),
        PointerPhase::Up => PointerEvent::Up,
    };

    let outcome = state
        .canvas
        .with_session(id, |session| session.pointer(event))
        .ok_or_else(|| session_not_found(id))?;
    Ok(Json(ApiResponse::success(outcome)))
}

/// POST /api/v1/canvas/sessions/:id/tickers
pub async fn add_ticker(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddTickerRequest>,
) -> ApiResult<Json<ApiResponse<Uuid>>> {
    let at = match (request.x, request.y) {
        (Some(x), Some(y)) => fincanvas_core::canvas::Point::new(x, y),
        _ => default_drop_point(),
    };
    let ticker_id = state
        .canvas
        .with_session(id, |session| session.add_ticker(&request.symbol, Some(at)))
        .ok_or_else(|| session_not_found(id))??;
    Ok(Json(ApiResponse::success(ticker_id)))
}

/// POST /api/v1/canvas/sessions/:id/ask
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<AskRequest>,
) -> ApiResult<Json<ApiResponse<AskReply>>> {
    let reply = state
        .canvas
        .with_session(id, |session| session.ask(&request.question))
        .ok_or_else(|| session_not_found(id))??;
    info!(session_id = %id, overlays = reply.overlays_added, "canvas question answered");
    Ok(Json(ApiResponse::success(reply)))
}

/// DELETE /api/v1/canvas/sessions/:id/selection
pub async fn delete_selection(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Option<Uuid>>>> {
    let removed = state
        .canvas
        .with_session(id, |session| session.delete_selected())
        .ok_or_else(|| session_not_found(id))?;
    Ok(Json(ApiResponse::success(removed)))
}

/// POST /api/v1/canvas/sessions/:id/clear
pub async fn clear(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>> {
    state
        .canvas
        .with_session(id, |session| session.clear())
        .ok_or_else(|| session_not_found(id))?;
    Ok(Json(ApiResponse::success(())))
}

/// Ticker search query
#[derive(Debug, Deserialize)]
pub struct SymbolSearchQuery {
    pub q: String,
}

/// GET /api/v1/canvas/symbols?q=ap
pub async fn search_symbols(
    Query(query): Query<SymbolSearchQuery>,
) -> Json<ApiResponse<Vec<&'static SymbolQuote>>> {
    Json(ApiResponse::success(suggest_symbols(&query.q)))
}
