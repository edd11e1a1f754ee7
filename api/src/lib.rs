//! # FinCanvas API
//!
//! REST API for the FinCanvas demo trading dashboard. Serves portfolio,
//! market data, insight and seed endpoints over an in-memory document
//! store, plus the analysis-canvas session endpoints.
//!
//! ## Architecture
//!
//! - **Handlers**: thin axum handlers wrapping results in the response
//!   envelope
//! - **Services**: per-resource managers owning the domain logic
//! - **Store**: typed in-memory document collections
//!
//! All state lives in [`AppState`] and resets on restart; the demo has
//! no persistence.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use fincanvas_store::DocumentStore;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::services::{
    CanvasRegistry, InsightService, MarketService, PortfolioService, SeedService,
};

/// Shared application state handed to every handler.
pub struct AppState {
    pub store: Arc<DocumentStore>,
    pub portfolio: Arc<PortfolioService>,
    pub market: Arc<MarketService>,
    pub insights: Arc<InsightService>,
    pub seed: Arc<SeedService>,
    pub canvas: Arc<CanvasRegistry>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    /// Wires the store and services together.
    pub fn new(config: ApiConfig) -> Self {
        let store = Arc::new(DocumentStore::new());
        let portfolio = Arc::new(PortfolioService::new(store.clone()));
        let market = Arc::new(MarketService::new(store.clone()));
        let insights = Arc::new(InsightService::new(store.clone(), portfolio.clone()));
        let seed = Arc::new(SeedService::new(store.clone(), portfolio.clone()));
        let canvas = Arc::new(CanvasRegistry::new());

        Self {
            store,
            portfolio,
            market,
            insights,
            seed,
            canvas,
            config: Arc::new(config),
        }
    }
}

/// Builds the full application router over the shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let api_v1 = Router::new()
        // Portfolio
        .route("/portfolio", get(handlers::portfolio::get_overview))
        .route(
            "/portfolio/positions",
            get(handlers::portfolio::get_positions),
        )
        .route("/portfolio/history", get(handlers::portfolio::get_history))
        .route("/portfolio/trades", post(handlers::portfolio::place_trade))
        // Market data
        .route("/market/indices", get(handlers::market::get_indices))
        .route("/market/watchlist", get(handlers::market::get_watchlist))
        .route(
            "/market/:symbol/history",
            get(handlers::market::get_price_history),
        )
        // Insights
        .route(
            "/insights",
            get(handlers::insights::get_recent).post(handlers::insights::generate),
        )
        .route(
            "/insights/unread-count",
            get(handlers::insights::get_unread_count),
        )
        .route("/insights/:id/read", post(handlers::insights::mark_read))
        // Seeding
        .route("/seed/market", post(handlers::seed::seed_market))
        .route("/seed/portfolio", post(handlers::seed::seed_portfolio))
        // Analysis canvas
        .route("/canvas/sessions", post(handlers::canvas::create_session))
        .route(
            "/canvas/sessions/:id",
            get(handlers::canvas::get_session).delete(handlers::canvas::delete_session),
        )
        .route("/canvas/sessions/:id/tool", post(handlers::canvas::select_tool))
        .route("/canvas/sessions/:id/pointer", post(handlers::canvas::pointer))
        .route("/canvas/sessions/:id/tickers", post(handlers::canvas::add_ticker))
        .route("/canvas/sessions/:id/ask", post(handlers::canvas::ask))
        .route(
            "/canvas/sessions/:id/selection",
            delete(handlers::canvas::delete_selection),
        )
        .route("/canvas/sessions/:id/clear", post(handlers::canvas::clear))
        .route("/canvas/symbols", get(handlers::canvas::search_symbols));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/", get(handlers::api_info))
        .nest("/api/v1", api_v1)
        .layer(middleware::trace_layer())
        .layer(middleware::cors_layer(&state.config))
        .with_state(state)
}

/// The API server: router plus bound configuration.
pub struct ApiServer {
    router: Router,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Builds the server from configuration.
    pub async fn new(config: ApiConfig) -> ApiResult<Self> {
        config.validate()?;
        let state = Arc::new(AppState::new(config));
        let router = router(state.clone());
        Ok(Self { router, state })
    }

    /// Shared application state, used for pre-serve seeding.
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Binds the configured address and serves until shutdown.
    pub async fn serve(self) -> ApiResult<()> {
        let bind_address = self.state.config.bind_address;
        let listener = TcpListener::bind(bind_address)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {bind_address}: {e}")))?;
        info!("FinCanvas API listening on {bind_address}");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("shutdown signal received");
            })
            .await
            .map_err(|e| ApiError::internal(format!("Server error: {e}")))
    }
}
