//! Service layer over the document store.
//!
//! One service struct per dashboard resource, in the shape of the
//! backend's query/mutation surface: index-scoped reads plus field-level
//! arithmetic, and the demo trade settlement mutation. All methods run
//! against the in-memory store; mutations are atomic per call.

use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use fincanvas_core::canvas::{CanvasError, CanvasSession, Point};
use fincanvas_core::{
    settle_trade, Insight, InsightKind, MarketEntry, MarketKind, PortfolioPoint, Position,
    PriceBar, Severity, TimeRange, TradeOutcome, UserProfile,
};
use fincanvas_store::DocumentStore;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    GenerateInsightRequest, PlaceTradeRequest, PortfolioOverview, SeedOutcome, TradeReceipt,
};

/// How many insights the dashboard feed shows.
const INSIGHT_FEED_LIMIT: usize = 10;

/// Canned titles/messages used when a generated insight omits them.
const CANNED_INSIGHTS: [(&str, &str); 4] = [
    (
        "Momentum Check",
        "Recent price action suggests momentum is building. Watch volume for confirmation.",
    ),
    (
        "Sector Rotation",
        "Capital appears to be rotating into large-cap tech. Review your sector weights.",
    ),
    (
        "Volatility Watch",
        "Implied volatility is elevated versus the trailing month. Size positions accordingly.",
    ),
    (
        "Earnings Ahead",
        "An earnings date is approaching for a watchlist name. Expect wider intraday ranges.",
    ),
];

/// Manager for portfolio operations: overview arithmetic, position
/// listing, history reads and the demo trade mutation.
pub struct PortfolioService {
    store: Arc<DocumentStore>,
}

impl PortfolioService {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Returns the demo user, creating it on first access.
    ///
    /// Check and insert run under the users write guard so concurrent
    /// first accesses settle on one row.
    pub async fn demo_user(&self) -> ApiResult<UserProfile> {
        let user = self
            .store
            .users
            .with_write(|rows| {
                if let Some(existing) = rows.values().next() {
                    return existing.clone();
                }
                let user = UserProfile::demo();
                rows.insert(user.id, user.clone());
                user
            })
            .await;
        Ok(user)
    }

    /// Portfolio overview: summed market values and gain/loss figures.
    pub async fn overview(&self) -> ApiResult<PortfolioOverview> {
        let user = self.demo_user().await?;
        let positions = self
            .store
            .positions
            .scan(|p| p.user_id == user.id)
            .await;

        let market_value: f64 = positions.iter().map(|p| p.market_value).sum();
        let cost_basis: f64 = positions.iter().map(|p| p.cost_basis * p.quantity).sum();
        let total_gain_loss = market_value - cost_basis;
        let total_gain_loss_percent = if cost_basis > 0.0 {
            total_gain_loss / cost_basis * 100.0
        } else {
            0.0
        };
        let today_gain_loss: f64 = positions.iter().map(|p| p.today_gain_loss).sum();
        let today_gain_loss_percent = if market_value > 0.0 {
            today_gain_loss / (market_value - today_gain_loss) * 100.0
        } else {
            0.0
        };

        Ok(PortfolioOverview {
            account_value: market_value + user.cash_buying_power,
            market_value,
            total_gain_loss,
            total_gain_loss_percent,
            today_gain_loss,
            today_gain_loss_percent,
            cash_buying_power: user.cash_buying_power,
            total_positions: positions.len(),
        })
    }

    /// All open positions for the demo user, ordered by symbol.
    pub async fn positions(&self) -> ApiResult<Vec<Position>> {
        let user = self.demo_user().await?;
        let mut positions = self
            .store
            .positions
            .scan(|p| p.user_id == user.id)
            .await;
        positions.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(positions)
    }

    /// Portfolio history points since the range start, ascending.
    pub async fn history(&self, range: Option<TimeRange>) -> ApiResult<Vec<PortfolioPoint>> {
        let user = self.demo_user().await?;
        let start = range
            .unwrap_or(TimeRange::OneMonth)
            .start_from(Utc::now());
        let mut points = self
            .store
            .portfolio_history
            .scan(|p| p.user_id == user.id && p.timestamp >= start)
            .await;
        points.sort_by_key(|p| p.timestamp);
        Ok(points)
    }

    /// Settles a demo trade: open, weighted-average buy, reduce or close.
    ///
    /// The whole read-modify-write runs under the positions collection
    /// write guard, so concurrent trades on the same symbol serialize.
    pub async fn place_trade(&self, request: PlaceTradeRequest) -> ApiResult<TradeReceipt> {
        let user = self.demo_user().await?;
        let symbol = request.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ApiError::validation(
                "Symbol must not be empty",
                Some("symbol"),
            ));
        }

        info!(
            symbol = %symbol,
            side = %request.side,
            quantity = request.quantity,
            price = request.price,
            "settling demo trade"
        );

        let outcome = self
            .store
            .positions
            .with_write(|rows| {
                let existing = rows
                    .values()
                    .find(|p| p.user_id == user.id && p.symbol == symbol)
                    .cloned();
                let outcome = settle_trade(
                    existing,
                    user.id,
                    &symbol,
                    request.company_name.trim(),
                    request.side,
                    request.quantity,
                    request.price,
                )?;
                match &outcome {
                    TradeOutcome::Opened(position) | TradeOutcome::Updated(position) => {
                        rows.insert(position.id, position.clone());
                    }
                    TradeOutcome::Closed { position_id, .. } => {
                        rows.remove(position_id);
                    }
                }
                Ok::<_, ApiError>(outcome)
            })
            .await?;

        // Keep the profile's position count in sync with the table
        let open_positions = self
            .store
            .positions
            .count(|p| p.user_id == user.id)
            .await;
        self.store
            .users
            .patch(user.id, |u| u.total_positions = open_positions)
            .await?;

        let filled_quantity = outcome.filled(request.quantity);
        let (position, closed) = match outcome {
            TradeOutcome::Opened(position) | TradeOutcome::Updated(position) => {
                (Some(position), false)
            }
            TradeOutcome::Closed { .. } => (None, true),
        };

        Ok(TradeReceipt {
            symbol,
            side: request.side,
            filled_quantity,
            price: request.price,
            position,
            closed,
        })
    }
}

/// Service for market data reads.
pub struct MarketService {
    store: Arc<DocumentStore>,
}

impl MarketService {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Market entries flagged as indices, ordered by symbol.
    pub async fn indices(&self) -> Vec<MarketEntry> {
        let mut entries = self
            .store
            .market
            .scan(|e| e.kind == MarketKind::Index)
            .await;
        entries.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        entries
    }

    /// Watchlist entries, ordered by symbol.
    pub async fn watchlist(&self) -> Vec<MarketEntry> {
        let mut entries = self.store.market.scan(|e| e.watchlist).await;
        entries.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        entries
    }

    /// Price bars for a symbol since the range start, ascending.
    pub async fn price_history(&self, symbol: &str, range: Option<TimeRange>) -> Vec<PriceBar> {
        let symbol = symbol.trim().to_uppercase();
        let start = range.unwrap_or(TimeRange::OneDay).start_from(Utc::now());
        let mut bars = self
            .store
            .price_history
            .scan(|b| b.symbol == symbol && b.timestamp >= start)
            .await;
        bars.sort_by_key(|b| b.timestamp);
        bars
    }
}

/// Service for the insight feed.
pub struct InsightService {
    store: Arc<DocumentStore>,
    portfolio: Arc<PortfolioService>,
}

impl InsightService {
    pub fn new(store: Arc<DocumentStore>, portfolio: Arc<PortfolioService>) -> Self {
        Self { store, portfolio }
    }

    /// The ten most recent insights, newest first.
    pub async fn recent(&self) -> ApiResult<Vec<Insight>> {
        let user = self.portfolio.demo_user().await?;
        let mut insights = self
            .store
            .insights
            .scan(|i| i.user_id == user.id)
            .await;
        insights.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        insights.truncate(INSIGHT_FEED_LIMIT);
        Ok(insights)
    }

    /// Number of unread insights.
    pub async fn unread_count(&self) -> ApiResult<usize> {
        let user = self.portfolio.demo_user().await?;
        Ok(self
            .store
            .insights
            .count(|i| i.user_id == user.id && !i.read)
            .await)
    }

    /// Generates a demo insight; unset fields fall back to canned
    /// content.
    pub async fn generate(&self, request: GenerateInsightRequest) -> ApiResult<Insight> {
        let user = self.portfolio.demo_user().await?;
        let (canned_title, canned_message) = CANNED_INSIGHTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(CANNED_INSIGHTS[0]);

        let insight = Insight::new(
            user.id,
            InsightKind::Insight,
            request.title.unwrap_or_else(|| canned_title.to_string()),
            request
                .message
                .unwrap_or_else(|| canned_message.to_string()),
            request
                .symbol
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty()),
            request.severity.unwrap_or(Severity::Medium),
        );
        self.store.insights.insert(insight.clone()).await?;
        info!(insight_id = %insight.id, "demo insight generated");
        Ok(insight)
    }

    /// Marks one insight as read.
    pub async fn mark_read(&self, id: Uuid) -> ApiResult<Insight> {
        Ok(self.store.insights.patch(id, |i| i.read = true).await?)
    }
}

/// One-time seed mutations invoked on first dashboard load.
pub struct SeedService {
    store: Arc<DocumentStore>,
    portfolio: Arc<PortfolioService>,
}

impl SeedService {
    pub fn new(store: Arc<DocumentStore>, portfolio: Arc<PortfolioService>) -> Self {
        Self { store, portfolio }
    }

    /// Seeds market indices, watchlist stocks and synthetic daily price
    /// bars. A second call is a no-op.
    pub async fn seed_market(&self) -> ApiResult<(bool, String)> {
        if !self.store.market.is_empty().await {
            return Ok((false, "Market data already seeded".to_string()));
        }

        let indices = [
            ("^GSPC", "S&P 500", 4783.45, -12.37, -0.26, 0.0),
            ("^DJI", "Dow Jones", 37863.80, -57.44, -0.15, 0.0),
            ("^IXIC", "NASDAQ", 15055.65, 45.12, 0.30, 0.0),
            ("^RUT", "Russell 2000", 2043.22, 8.91, 0.44, 0.0),
        ];
        let watchlist = [
            ("AAPL", "Apple Inc.", 171.62, -0.95, -0.55, 834_156.0),
            ("GOOGL", "Alphabet Inc.", 139.17, -1.12, -0.80, 1_404_486.0),
            ("TSLA", "Tesla Inc.", 248.50, -0.31, -0.12, 2_388_945.0),
            ("MSFT", "Microsoft Corp.", 417.30, 1.25, 0.30, 490_488.0),
        ];

        for (symbol, name, price, change, change_percent, volume) in indices {
            let entry = MarketEntry::new(
                symbol,
                name,
                price,
                change,
                change_percent,
                volume,
                MarketKind::Index,
                false,
            );
            self.store.market.insert(entry).await?;
            self.seed_price_bars(symbol, price).await?;
        }
        for (symbol, name, price, change, change_percent, volume) in watchlist {
            let entry = MarketEntry::new(
                symbol,
                name,
                price,
                change,
                change_percent,
                volume,
                MarketKind::Stock,
                true,
            );
            self.store.market.insert(entry).await?;
            self.seed_price_bars(symbol, price).await?;
        }

        info!("market data seeded");
        Ok((true, "Market data seeded successfully".to_string()))
    }

    /// Seeds demo positions, 31 days of portfolio history and starter
    /// insights, and patches the user profile. A second call is a no-op.
    pub async fn seed_portfolio(&self) -> ApiResult<(bool, String)> {
        let user = self.portfolio.demo_user().await?;
        if self
            .store
            .positions
            .count(|p| p.user_id == user.id)
            .await
            > 0
        {
            return Ok((false, "User portfolio already seeded".to_string()));
        }

        // (symbol, name, qty, cost, price, today_gl, today_gl_pct)
        let holdings = [
            ("AAPL", "Apple Inc.", 100.0, 150.0, 171.62, -95.00, -0.55),
            ("TSLA", "Tesla Inc.", 50.0, 200.0, 248.50, -15.50, -0.12),
            ("MSFT", "Microsoft Corp.", 75.0, 300.0, 417.30, 93.75, 0.30),
        ];
        for (symbol, name, quantity, cost_basis, price, today_gl, today_gl_pct) in holdings {
            let mut position = Position::open(user.id, symbol, name, quantity, cost_basis, price);
            position.today_gain_loss = today_gl;
            position.today_gain_loss_percent = today_gl_pct;
            self.store.positions.insert(position).await?;
        }

        self.store
            .users
            .patch(user.id, |u| {
                u.portfolio_value = 60_884.50;
                u.cash_buying_power = 25_000.00;
                u.total_positions = 3;
            })
            .await?;

        // ThreadRng is !Send, so all points are drawn before the inserts
        let now = Utc::now();
        let points: Vec<PortfolioPoint> = {
            let mut rng = rand::thread_rng();
            (0..=30)
                .rev()
                .map(|i| {
                    let base_value = 58_000.0 + rng.gen::<f64>() * 5_000.0;
                    let day_change = (rng.gen::<f64>() - 0.5) * 1_000.0;
                    PortfolioPoint {
                        id: Uuid::new_v4(),
                        user_id: user.id,
                        timestamp: now - Duration::days(i),
                        total_value: base_value,
                        day_change,
                        day_change_percent: day_change / base_value * 100.0,
                    }
                })
                .collect()
        };
        for point in points {
            self.store.portfolio_history.insert(point).await?;
        }

        let starters = [
            Insight::new(
                user.id,
                InsightKind::Alert,
                "High Volatility Alert",
                "TSLA showing increased volatility. Consider reviewing position size.",
                Some("TSLA".to_string()),
                Severity::Medium,
            ),
            Insight::new(
                user.id,
                InsightKind::Insight,
                "Portfolio Diversification",
                "Your portfolio is well-diversified across tech sectors. Consider adding exposure to other industries.",
                None,
                Severity::Low,
            ),
        ];
        for insight in starters {
            self.store.insights.insert(insight).await?;
        }

        info!(user_id = %user.id, "user portfolio seeded");
        Ok((true, "User portfolio seeded successfully".to_string()))
    }

    /// Random-walks 90 daily OHLCV bars backward from the seeded price.
    ///
    /// The bars are fully built before the first insert so no rng handle
    /// lives across an await.
    async fn seed_price_bars(&self, symbol: &str, last_price: f64) -> ApiResult<()> {
        let now = Utc::now();
        let bars: Vec<PriceBar> = {
            let mut rng = rand::thread_rng();

            let mut closes = vec![0.0; 90];
            let mut price = last_price;
            for close in closes.iter_mut().rev() {
                *close = price;
                let drift = (rng.gen::<f64>() - 0.5) * 0.02;
                price /= 1.0 + drift;
            }

            closes
                .iter()
                .enumerate()
                .map(|(i, close)| {
                    let open = if i == 0 { *close } else { closes[i - 1] };
                    let spread = (rng.gen::<f64>() * 0.01 + 0.002) * close;
                    PriceBar {
                        id: Uuid::new_v4(),
                        symbol: symbol.to_string(),
                        timestamp: now - Duration::days((90 - i) as i64),
                        open,
                        high: open.max(*close) + spread,
                        low: open.min(*close) - spread,
                        close: *close,
                        volume: rng.gen_range(100_000.0..5_000_000.0),
                    }
                })
                .collect()
        };

        for bar in bars {
            self.store.price_history.insert(bar).await?;
        }
        Ok(())
    }
}

impl SeedService {
    /// Seed outcome as an API model.
    pub fn outcome((seeded, message): (bool, String)) -> SeedOutcome {
        SeedOutcome { seeded, message }
    }
}

/// Registry of live canvas sessions, keyed by session id.
#[derive(Default)]
pub struct CanvasRegistry {
    sessions: DashMap<Uuid, CanvasSession>,
}

impl CanvasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session, optionally dropping an initial ticker node.
    pub fn create(&self, symbol: Option<&str>) -> Result<Uuid, CanvasError> {
        let session = match symbol {
            Some(symbol) => CanvasSession::with_symbol(symbol)?,
            None => CanvasSession::new(),
        };
        let id = Uuid::new_v4();
        self.sessions.insert(id, session);
        Ok(id)
    }

    /// Returns a snapshot of the session state.
    pub fn snapshot(&self, id: Uuid) -> Option<CanvasSession> {
        self.sessions.get(&id).map(|s| s.clone())
    }

    /// Runs `f` against the session under its map guard.
    pub fn with_session<R>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut CanvasSession) -> R,
    ) -> Option<R> {
        self.sessions.get_mut(&id).map(|mut s| f(&mut s))
    }

    /// Drops the session. Returns false if it did not exist.
    pub fn remove(&self, id: Uuid) -> bool {
        self.sessions.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Default drop point for tickers added without coordinates.
pub fn default_drop_point() -> Point {
    Point::new(200.0, 150.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fincanvas_core::TradeSide;

    fn services() -> (
        Arc<DocumentStore>,
        Arc<PortfolioService>,
        Arc<MarketService>,
        Arc<InsightService>,
        Arc<SeedService>,
    ) {
        let store = Arc::new(DocumentStore::new());
        let portfolio = Arc::new(PortfolioService::new(store.clone()));
        let market = Arc::new(MarketService::new(store.clone()));
        let insights = Arc::new(InsightService::new(store.clone(), portfolio.clone()));
        let seed = Arc::new(SeedService::new(store.clone(), portfolio.clone()));
        (store, portfolio, market, insights, seed)
    }

    fn trade(symbol: &str, side: TradeSide, quantity: f64, price: f64) -> PlaceTradeRequest {
        PlaceTradeRequest {
            symbol: symbol.to_string(),
            company_name: format!("{symbol} Corp."),
            side,
            quantity,
            price,
        }
    }

    #[tokio::test]
    async fn demo_user_is_created_once_with_default_cash() {
        let (store, portfolio, ..) = services();
        let first = portfolio.demo_user().await.unwrap();
        let second = portfolio.demo_user().await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.cash_buying_power, UserProfile::DEFAULT_CASH);
        assert_eq!(store.users.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_first_accesses_settle_on_one_demo_user() {
        let (store, portfolio, ..) = services();
        let mut handles = Vec::new();
        for _ in 0..32 {
            let portfolio = portfolio.clone();
            handles.push(tokio::spawn(async move {
                portfolio.demo_user().await.unwrap().id
            }));
        }
        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }

        assert_eq!(store.users.len().await, 1);
        assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));
    }

    // The seed methods draw from ThreadRng, which is !Send; this pins
    // down that no rng handle is held across an await so the futures
    // stay usable from axum handlers.
    #[test]
    fn seed_futures_are_send() {
        fn assert_send<F: std::future::Future + Send>(_: F) {}

        let (_, _, _, _, seed) = services();
        assert_send(seed.seed_market());
        assert_send(seed.seed_portfolio());
    }

    #[tokio::test]
    async fn buy_then_buy_weighted_averages_through_the_service() {
        let (store, portfolio, ..) = services();
        portfolio
            .place_trade(trade("AAPL", TradeSide::Buy, 10.0, 100.0))
            .await
            .unwrap();
        let receipt = portfolio
            .place_trade(trade("aapl", TradeSide::Buy, 30.0, 200.0))
            .await
            .unwrap();

        // Symbols normalize, so both trades hit one row
        assert_eq!(store.positions.len().await, 1);
        let position = receipt.position.unwrap();
        assert_eq!(position.symbol, "AAPL");
        assert_eq!(position.quantity, 40.0);
        assert!((position.cost_basis - 175.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn closing_sell_deletes_the_row_and_updates_the_profile() {
        let (store, portfolio, ..) = services();
        portfolio
            .place_trade(trade("TSLA", TradeSide::Buy, 50.0, 200.0))
            .await
            .unwrap();
        let receipt = portfolio
            .place_trade(trade("TSLA", TradeSide::Sell, 80.0, 250.0))
            .await
            .unwrap();

        assert!(receipt.closed);
        assert_eq!(receipt.filled_quantity, 50.0);
        assert!(store.positions.is_empty().await);
        let user = portfolio.demo_user().await.unwrap();
        assert_eq!(user.total_positions, 0);
    }

    #[tokio::test]
    async fn invalid_trades_are_rejected() {
        let (_, portfolio, ..) = services();
        let err = portfolio
            .place_trade(trade("AAPL", TradeSide::Buy, 0.0, 100.0))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        let err = portfolio
            .place_trade(trade("AAPL", TradeSide::Buy, 1.0, 0.0))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");

        let err = portfolio
            .place_trade(trade("", TradeSide::Buy, 1.0, 1.0))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn overview_matches_the_dashboard_arithmetic() {
        let (_, portfolio, _, _, seed) = services();
        let (seeded, _) = seed.seed_portfolio().await.unwrap();
        assert!(seeded);

        let overview = portfolio.overview().await.unwrap();
        // 100*171.62 + 50*248.50 + 75*417.30 = 60884.50
        assert!((overview.market_value - 60_884.50).abs() < 1e-6);
        // cost basis: 100*150 + 50*200 + 75*300 = 47500
        assert!((overview.total_gain_loss - 13_384.50).abs() < 1e-6);
        assert!((overview.total_gain_loss_percent - 13_384.50 / 47_500.0 * 100.0).abs() < 1e-9);
        // today: -95.00 - 15.50 + 93.75 = -16.75
        assert!((overview.today_gain_loss + 16.75).abs() < 1e-9);
        assert!((overview.cash_buying_power - 25_000.0).abs() < 1e-9);
        assert!((overview.account_value - 85_884.50).abs() < 1e-6);
        assert_eq!(overview.total_positions, 3);
    }

    #[tokio::test]
    async fn empty_portfolio_overview_is_all_zero_percentages() {
        let (_, portfolio, ..) = services();
        let overview = portfolio.overview().await.unwrap();
        assert_eq!(overview.market_value, 0.0);
        assert_eq!(overview.total_gain_loss_percent, 0.0);
        assert_eq!(overview.today_gain_loss_percent, 0.0);
        assert_eq!(overview.account_value, UserProfile::DEFAULT_CASH);
    }

    #[tokio::test]
    async fn seeds_are_idempotent() {
        let (store, _, _, _, seed) = services();
        assert!(seed.seed_market().await.unwrap().0);
        assert!(!seed.seed_market().await.unwrap().0);
        // 4 indices + 4 watchlist stocks
        assert_eq!(store.market.len().await, 8);
        // 90 bars per seeded symbol
        assert_eq!(store.price_history.len().await, 8 * 90);

        assert!(seed.seed_portfolio().await.unwrap().0);
        assert!(!seed.seed_portfolio().await.unwrap().0);
        assert_eq!(store.positions.len().await, 3);
        assert_eq!(store.portfolio_history.len().await, 31);
        assert_eq!(store.insights.len().await, 2);
    }

    #[tokio::test]
    async fn market_reads_split_indices_and_watchlist() {
        let (_, _, market, _, seed) = services();
        seed.seed_market().await.unwrap();

        let indices = market.indices().await;
        assert_eq!(indices.len(), 4);
        assert!(indices.iter().all(|e| e.kind == MarketKind::Index));

        let watchlist = market.watchlist().await;
        assert_eq!(watchlist.len(), 4);
        assert!(watchlist.iter().all(|e| e.watchlist));
        assert_eq!(watchlist[0].symbol, "AAPL");
    }

    #[tokio::test]
    async fn price_history_filters_by_symbol_and_range() {
        let (_, _, market, _, seed) = services();
        seed.seed_market().await.unwrap();

        // Bars are seeded one to ninety days back, so a five-day window
        // opening just after the seed instant catches the newest four
        let bars = market
            .price_history("AAPL", Some(TimeRange::FiveDays))
            .await;
        assert_eq!(bars.len(), 4);
        assert!(bars.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        // Newest bar carries the seeded price
        assert!((bars.last().unwrap().close - 171.62).abs() < 1e-9);

        assert!(market.price_history("ZZZZ", None).await.is_empty());
    }

    #[tokio::test]
    async fn insight_feed_caps_at_ten_newest_first() {
        let (store, _, _, insights, _) = services();
        let mut ids = Vec::new();
        for i in 0..12 {
            let insight = insights
                .generate(GenerateInsightRequest {
                    title: Some(format!("insight {i}")),
                    ..Default::default()
                })
                .await
                .unwrap();
            ids.push(insight.id);
        }
        // Force distinct, ordered creation times
        let base = Utc::now();
        for (i, id) in ids.iter().enumerate() {
            store
                .insights
                .patch(*id, |ins| {
                    ins.created_at = base + Duration::seconds(i as i64);
                })
                .await
                .unwrap();
        }

        let feed = insights.recent().await.unwrap();
        assert_eq!(feed.len(), 10);
        assert_eq!(feed[0].title, "insight 11");
        assert_eq!(feed[9].title, "insight 2");
    }

    #[tokio::test]
    async fn unread_count_tracks_the_read_flag() {
        let (_, _, _, insights, _) = services();
        let a = insights
            .generate(GenerateInsightRequest::default())
            .await
            .unwrap();
        insights
            .generate(GenerateInsightRequest::default())
            .await
            .unwrap();
        assert_eq!(insights.unread_count().await.unwrap(), 2);

        let read = insights.mark_read(a.id).await.unwrap();
        assert!(read.read);
        assert_eq!(insights.unread_count().await.unwrap(), 1);

        let err = insights.mark_read(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn generated_insights_fall_back_to_canned_content() {
        let (_, _, _, insights, _) = services();
        let insight = insights
            .generate(GenerateInsightRequest {
                symbol: Some("tsla".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(insight.symbol.as_deref(), Some("TSLA"));
        assert_eq!(insight.severity, Severity::Medium);
        assert!(CANNED_INSIGHTS.iter().any(|(t, _)| *t == insight.title));
    }

    #[test]
    fn canvas_registry_round_trip() {
        let registry = CanvasRegistry::new();
        let id = registry.create(Some("AAPL")).unwrap();
        assert_eq!(registry.len(), 1);

        let tickers = registry
            .with_session(id, |s| s.tickers.len())
            .unwrap();
        assert_eq!(tickers, 1);

        let snapshot = registry.snapshot(id).unwrap();
        assert_eq!(snapshot.tickers[0].symbol, "AAPL");

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert!(registry.is_empty());

        assert!(registry.create(Some("ZZZZ")).is_err());
    }
}
