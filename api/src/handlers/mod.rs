//! HTTP request handlers
//!
//! One module per dashboard resource. Handlers extract the shared
//! [`AppState`](crate::AppState), delegate to the service layer and wrap
//! results in the common response envelope.

pub mod canvas;
pub mod insights;
pub mod market;
pub mod portfolio;
pub mod seed;

use axum::Json;
use serde_json::{json, Value};

/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
        "service": "fincanvas-api"
    }))
}

/// API information endpoint
pub async fn api_info() -> Json<Value> {
    Json(json!({
        "name": "FinCanvas API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Demo trading dashboard backend",
        "endpoints": {
            "health": "/health",
            "portfolio": "/api/v1/portfolio",
            "market": "/api/v1/market",
            "insights": "/api/v1/insights",
            "seed": "/api/v1/seed",
            "canvas": "/api/v1/canvas"
        }
    }))
}
