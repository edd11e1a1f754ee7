//! API response models and data structures
//!
//! Request/response structures used by the API endpoints, along with the
//! common success-envelope type.

use chrono::{DateTime, Utc};
use fincanvas_core::canvas::{Point, Tool};
use fincanvas_core::{Severity, TimeRange, TradeSide};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Standardized API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,

    /// Response data (None if error occurred)
    pub data: Option<T>,

    /// Error message (None if successful)
    pub error: Option<String>,

    /// Response timestamp
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Create an error response
    pub fn error(error_message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error_message),
            timestamp: Utc::now(),
        }
    }
}

/// Time-range query parameter for history endpoints
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RangeQuery {
    /// Dashboard time range (1D, 5D, 1M, 3M, YTD)
    pub range: Option<TimeRange>,
}

/// Portfolio overview figures shown at the top of the dashboard
#[derive(Debug, Serialize, Deserialize)]
pub struct PortfolioOverview {
    /// Market value of all positions plus cash
    pub account_value: f64,

    /// Market value of all positions
    pub market_value: f64,

    /// Total gain/loss in dollars
    pub total_gain_loss: f64,

    /// Total gain/loss as a percentage of cost basis
    pub total_gain_loss_percent: f64,

    /// Today's gain/loss in dollars
    pub today_gain_loss: f64,

    /// Today's gain/loss as a percentage
    pub today_gain_loss_percent: f64,

    /// Cash available for demo trades
    pub cash_buying_power: f64,

    /// Number of open positions
    pub total_positions: usize,
}

/// Demo trade placement request
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaceTradeRequest {
    /// Ticker symbol (e.g. "AAPL")
    pub symbol: String,

    /// Company display name used when opening a new position
    pub company_name: String,

    /// Buy or sell
    pub side: TradeSide,

    /// Shares to trade
    pub quantity: f64,

    /// Price per share
    pub price: f64,
}

/// Result of a settled demo trade
#[derive(Debug, Serialize, Deserialize)]
pub struct TradeReceipt {
    /// Ticker symbol
    pub symbol: String,

    /// Buy or sell
    pub side: TradeSide,

    /// Shares actually filled (sells clamp to the held quantity)
    pub filled_quantity: f64,

    /// Price per share
    pub price: f64,

    /// The resulting position, absent when the trade closed it
    pub position: Option<fincanvas_core::Position>,

    /// Whether the trade closed the position
    pub closed: bool,
}

/// Demo insight generation request; unset fields fall back to canned
/// content.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GenerateInsightRequest {
    pub symbol: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub severity: Option<Severity>,
}

/// Unread insight count
#[derive(Debug, Serialize, Deserialize)]
pub struct UnreadCount {
    pub unread: usize,
}

/// Outcome of a seed call
#[derive(Debug, Serialize, Deserialize)]
pub struct SeedOutcome {
    /// Whether any rows were written (false when already seeded)
    pub seeded: bool,

    /// Human-readable status message
    pub message: String,
}

/// Canvas session creation request
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    /// Optional symbol dropped onto the fresh canvas
    pub symbol: Option<String>,
}

/// Canvas session creation response
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

/// Tool selection request
#[derive(Debug, Serialize, Deserialize)]
pub struct SelectToolRequest {
    pub tool: Tool,
}

/// Pointer event phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// Pointer event request; coordinates are required for down/move
#[derive(Debug, Serialize, Deserialize)]
pub struct PointerRequest {
    pub phase: PointerPhase,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl PointerRequest {
    /// Extracts the coordinate, if present.
    pub fn point(&self) -> Option<Point> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some(Point::new(x, y)),
            _ => None,
        }
    }
}

/// Ticker drop request
#[derive(Debug, Serialize, Deserialize)]
pub struct AddTickerRequest {
    pub symbol: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// Canvas AI question request
#[derive(Debug, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_response_carries_data() {
        let response = ApiResponse::success(42);
        assert!(response.success);
        assert_eq!(response.data, Some(42));
        assert!(response.error.is_none());
    }

    #[test]
    fn error_response_carries_message() {
        let response: ApiResponse<()> = ApiResponse::error("boom".to_string());
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error.as_deref(), Some("boom"));
    }

    #[test]
    fn range_query_parses_dashboard_labels() {
        let query: RangeQuery = serde_json::from_str(r#"{"range":"3M"}"#).unwrap();
        assert_eq!(query.range, Some(TimeRange::ThreeMonths));

        let query: RangeQuery = serde_json::from_str("{}").unwrap();
        assert!(query.range.is_none());
    }

    #[test]
    fn pointer_request_extracts_points() {
        let request = PointerRequest {
            phase: PointerPhase::Down,
            x: Some(10.0),
            y: Some(20.0),
        };
        assert_eq!(request.point(), Some(Point::new(10.0, 20.0)));

        let request = PointerRequest {
            phase: PointerPhase::Up,
            x: None,
            y: None,
        };
        assert!(request.point().is_none());
    }

    #[test]
    fn trade_request_deserializes_lowercase_side() {
        let request: PlaceTradeRequest = serde_json::from_str(
            r#"{"symbol":"AAPL","company_name":"Apple Inc.","side":"buy","quantity":10,"price":171.62}"#,
        )
        .unwrap();
        assert_eq!(request.side, TradeSide::Buy);
        assert_eq!(request.quantity, 10.0);
    }
}
