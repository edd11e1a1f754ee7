//! Core document types for the FinCanvas demo backend.
//!
//! These mirror the dashboard's document-store schema: one row type per
//! collection, with derived gain/loss fields stored redundantly on the
//! position rows and overwritten on every mutation.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Trading symbols and identifiers
pub type Symbol = String;
pub type UserId = Uuid;

/// Demo user profile with portfolio scalars patched by the seed flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Unique user identifier
    pub id: UserId,

    /// Display name
    pub name: String,

    /// Contact email, if known
    pub email: Option<String>,

    /// Total portfolio value snapshot
    pub portfolio_value: f64,

    /// Cash available for demo trades
    pub cash_buying_power: f64,

    /// Number of open positions
    pub total_positions: usize,

    /// Self-reported risk tolerance
    pub risk_tolerance: Option<String>,

    /// Self-reported trading experience
    pub trading_experience: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Default cash balance before the portfolio seed runs.
    pub const DEFAULT_CASH: f64 = 10_000.0;

    /// Creates the demo user profile with pre-seed defaults.
    pub fn demo() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: "Demo Trader".to_string(),
            email: Some("demo@fincanvas.dev".to_string()),
            portfolio_value: 0.0,
            cash_buying_power: Self::DEFAULT_CASH,
            total_positions: 0,
            risk_tolerance: Some("moderate".to_string()),
            trading_experience: Some("intermediate".to_string()),
            created_at: Utc::now(),
        }
    }
}

/// A user's holding of one ticker symbol.
///
/// Invariant: at most one row per (user, symbol). The market value and
/// gain/loss fields are recomputed and overwritten whenever the row is
/// touched, never derived lazily.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Unique position identifier
    pub id: Uuid,

    /// Owning user
    pub user_id: UserId,

    /// Ticker symbol (e.g. "AAPL")
    pub symbol: Symbol,

    /// Company display name
    pub company_name: String,

    /// Shares held
    pub quantity: f64,

    /// Average cost per share
    pub cost_basis: f64,

    /// Last traded price
    pub current_price: f64,

    /// quantity * current_price
    pub market_value: f64,

    /// Today's gain/loss in dollars
    pub today_gain_loss: f64,

    /// Total gain/loss in dollars since cost basis
    pub total_gain_loss: f64,

    /// Today's gain/loss as a percentage
    pub today_gain_loss_percent: f64,

    /// Total gain/loss as a percentage of cost basis
    pub total_gain_loss_percent: f64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Position {
    /// Creates a fresh position and computes its derived fields.
    pub fn open(
        user_id: UserId,
        symbol: impl Into<Symbol>,
        company_name: impl Into<String>,
        quantity: f64,
        cost_basis: f64,
        current_price: f64,
    ) -> Self {
        let mut position = Self {
            id: Uuid::new_v4(),
            user_id,
            symbol: symbol.into(),
            company_name: company_name.into(),
            quantity,
            cost_basis,
            current_price,
            market_value: 0.0,
            today_gain_loss: 0.0,
            total_gain_loss: 0.0,
            today_gain_loss_percent: 0.0,
            total_gain_loss_percent: 0.0,
            created_at: Utc::now(),
        };
        position.refresh_derived();
        position
    }

    /// Recomputes the stored market value and total gain/loss fields from
    /// quantity, cost basis and current price. Today's fields track the
    /// daily snapshot and are only written by the seed flow.
    pub fn refresh_derived(&mut self) {
        self.market_value = self.quantity * self.current_price;
        self.total_gain_loss = self.market_value - self.quantity * self.cost_basis;
        self.total_gain_loss_percent = if self.cost_basis > 0.0 {
            (self.current_price - self.cost_basis) / self.cost_basis * 100.0
        } else {
            0.0
        };
    }
}

/// Buy or sell side of a demo trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

/// Kind of a market data row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketKind {
    Stock,
    Index,
    Crypto,
}

/// Market snapshot row for an index, stock or crypto symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketEntry {
    /// Unique row identifier
    pub id: Uuid,

    /// Ticker symbol
    pub symbol: Symbol,

    /// Display name
    pub name: String,

    /// Last price
    pub price: f64,

    /// Absolute change since previous close
    pub change: f64,

    /// Percentage change since previous close
    pub change_percent: f64,

    /// Traded volume
    pub volume: f64,

    /// Market capitalization, if known
    pub market_cap: Option<f64>,

    /// Row kind (stock, index, crypto)
    pub kind: MarketKind,

    /// Whether the row shows up on the watchlist
    pub watchlist: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl MarketEntry {
    pub fn new(
        symbol: impl Into<Symbol>,
        name: impl Into<String>,
        price: f64,
        change: f64,
        change_percent: f64,
        volume: f64,
        kind: MarketKind,
        watchlist: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            name: name.into(),
            price,
            change,
            change_percent,
            volume,
            market_cap: None,
            kind,
            watchlist,
            created_at: Utc::now(),
        }
    }
}

/// One OHLCV bar of historical price data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBar {
    /// Unique row identifier
    pub id: Uuid,

    /// Ticker symbol
    pub symbol: Symbol,

    /// Bar timestamp
    pub timestamp: DateTime<Utc>,

    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Timestamped total-value snapshot of a user's portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioPoint {
    /// Unique row identifier
    pub id: Uuid,

    /// Owning user
    pub user_id: UserId,

    /// Snapshot timestamp
    pub timestamp: DateTime<Utc>,

    /// Total portfolio value at the snapshot
    pub total_value: f64,

    /// Change versus the previous day
    pub day_change: f64,

    /// Change versus the previous day as a percentage
    pub day_change_percent: f64,
}

/// Kind of a generated insight row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Alert,
    Insight,
    Recommendation,
}

/// Severity of an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A generated textual alert/message associated with a user and
/// optionally a symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    /// Unique row identifier
    pub id: Uuid,

    /// Owning user
    pub user_id: UserId,

    /// Row kind (alert, insight, recommendation)
    pub kind: InsightKind,

    /// Short headline
    pub title: String,

    /// Full message body
    pub message: String,

    /// Related ticker symbol, if any
    pub symbol: Option<Symbol>,

    /// Severity level
    pub severity: Severity,

    /// Whether the user has read the row
    pub read: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Insight {
    pub fn new(
        user_id: UserId,
        kind: InsightKind,
        title: impl Into<String>,
        message: impl Into<String>,
        symbol: Option<Symbol>,
        severity: Severity,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            symbol,
            severity,
            read: false,
            created_at: Utc::now(),
        }
    }
}

/// Dashboard time range selector for history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "5D")]
    FiveDays,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "YTD")]
    YearToDate,
}

impl TimeRange {
    /// Returns the inclusive start instant of the range ending at `now`.
    pub fn start_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            TimeRange::OneDay => now - Duration::days(1),
            TimeRange::FiveDays => now - Duration::days(5),
            TimeRange::OneMonth => now - Duration::days(30),
            TimeRange::ThreeMonths => now - Duration::days(90),
            TimeRange::YearToDate => Utc
                .with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0)
                .single()
                .unwrap_or(now),
        }
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1D" => Ok(TimeRange::OneDay),
            "5D" => Ok(TimeRange::FiveDays),
            "1M" => Ok(TimeRange::OneMonth),
            "3M" => Ok(TimeRange::ThreeMonths),
            "YTD" => Ok(TimeRange::YearToDate),
            other => Err(format!(
                "Invalid time range '{other}'. Allowed values: 1D, 5D, 1M, 3M, YTD"
            )),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeRange::OneDay => "1D",
            TimeRange::FiveDays => "5D",
            TimeRange::OneMonth => "1M",
            TimeRange::ThreeMonths => "3M",
            TimeRange::YearToDate => "YTD",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_open_computes_derived_fields() {
        let position = Position::open(Uuid::new_v4(), "AAPL", "Apple Inc.", 100.0, 150.0, 171.62);
        assert!((position.market_value - 17_162.0).abs() < 1e-9);
        assert!((position.total_gain_loss - 2_162.0).abs() < 1e-9);
        assert!((position.total_gain_loss_percent - 14.413333333333334).abs() < 1e-9);
    }

    #[test]
    fn refresh_derived_handles_zero_cost_basis() {
        let mut position = Position::open(Uuid::new_v4(), "FREE", "Free Corp.", 10.0, 0.0, 5.0);
        position.refresh_derived();
        assert_eq!(position.total_gain_loss_percent, 0.0);
        assert!((position.total_gain_loss - 50.0).abs() < 1e-9);
    }

    #[test]
    fn time_range_parses_dashboard_labels() {
        assert_eq!("1D".parse::<TimeRange>().unwrap(), TimeRange::OneDay);
        assert_eq!("5D".parse::<TimeRange>().unwrap(), TimeRange::FiveDays);
        assert_eq!("1M".parse::<TimeRange>().unwrap(), TimeRange::OneMonth);
        assert_eq!("3M".parse::<TimeRange>().unwrap(), TimeRange::ThreeMonths);
        assert_eq!("YTD".parse::<TimeRange>().unwrap(), TimeRange::YearToDate);
        assert!("2W".parse::<TimeRange>().is_err());
    }

    #[test]
    fn time_range_start_instants() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert_eq!(
            TimeRange::OneDay.start_from(now),
            now - Duration::days(1)
        );
        assert_eq!(
            TimeRange::ThreeMonths.start_from(now),
            now - Duration::days(90)
        );
        assert_eq!(
            TimeRange::YearToDate.start_from(now),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn trade_side_round_trips_through_serde() {
        let side: TradeSide = serde_json::from_str("\"buy\"").unwrap();
        assert_eq!(side, TradeSide::Buy);
        assert_eq!(serde_json::to_string(&TradeSide::Sell).unwrap(), "\"sell\"");
    }
}
