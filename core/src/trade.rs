//! Demo trade settlement.
//!
//! Pure settlement math for the "place demo trade" mutation: open a new
//! position, weighted-average into an existing one, or reduce/close on a
//! sell. No partial fills, no order book, no price validation against
//! market data. The caller applies the outcome to the document store
//! while holding the positions collection write guard.

use crate::types::{Position, Symbol, TradeSide, UserId};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while settling a demo trade
#[derive(Debug, Error, PartialEq)]
pub enum TradeError {
    #[error("Quantity must be greater than zero")]
    NonPositiveQuantity,

    #[error("Price must be greater than zero")]
    NonPositivePrice,

    #[error("No open position in {symbol} to sell")]
    NoPosition { symbol: Symbol },
}

/// Result of settling one demo trade against the current holding.
#[derive(Debug, Clone)]
pub enum TradeOutcome {
    /// Buy with no prior holding: insert this row.
    Opened(Position),

    /// Buy into or partial sell of an existing holding: replace the row.
    Updated(Position),

    /// Sell emptied the holding: delete the row. Carries the quantity
    /// actually filled, which may be less than requested.
    Closed { position_id: Uuid, filled: f64 },
}

impl TradeOutcome {
    /// Quantity actually filled by the trade.
    pub fn filled(&self, requested: f64) -> f64 {
        match self {
            TradeOutcome::Opened(_) | TradeOutcome::Updated(_) => requested,
            TradeOutcome::Closed { filled, .. } => *filled,
        }
    }
}

/// Settles a demo trade against the existing position, if any.
///
/// Buys with a prior holding take the quantity-weighted average cost:
/// `new_cost = (prev_qty * prev_cost + qty * price) / new_qty`. Sells
/// clamp to the held quantity; a sell that empties the position deletes
/// the row. Derived fields are refreshed against the trade price on
/// every path.
pub fn settle_trade(
    existing: Option<Position>,
    user_id: UserId,
    symbol: &str,
    company_name: &str,
    side: TradeSide,
    quantity: f64,
    price: f64,
) -> Result<TradeOutcome, TradeError> {
    if !(quantity > 0.0) {
        return Err(TradeError::NonPositiveQuantity);
    }
    if !(price > 0.0) {
        return Err(TradeError::NonPositivePrice);
    }

    match (side, existing) {
        (TradeSide::Buy, None) => Ok(TradeOutcome::Opened(Position::open(
            user_id,
            symbol,
            company_name,
            quantity,
            price,
            price,
        ))),
        (TradeSide::Buy, Some(mut position)) => {
            let prev_quantity = position.quantity;
            let new_quantity = prev_quantity + quantity;
            position.cost_basis =
                (prev_quantity * position.cost_basis + quantity * price) / new_quantity;
            position.quantity = new_quantity;
            position.current_price = price;
            position.refresh_derived();
            Ok(TradeOutcome::Updated(position))
        }
        (TradeSide::Sell, None) => Err(TradeError::NoPosition {
            symbol: symbol.to_string(),
        }),
        (TradeSide::Sell, Some(mut position)) => {
            // Clamp to the held quantity; no short selling in the demo.
            let filled = quantity.min(position.quantity);
            let remaining = position.quantity - filled;
            if remaining <= 0.0 {
                Ok(TradeOutcome::Closed {
                    position_id: position.id,
                    filled,
                })
            } else {
                position.quantity = remaining;
                position.current_price = price;
                position.refresh_derived();
                Ok(TradeOutcome::Updated(position))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buy(existing: Option<Position>, qty: f64, price: f64) -> TradeOutcome {
        settle_trade(
            existing,
            Uuid::new_v4(),
            "AAPL",
            "Apple Inc.",
            TradeSide::Buy,
            qty,
            price,
        )
        .unwrap()
    }

    #[test]
    fn buy_with_no_holding_opens_at_trade_price() {
        match buy(None, 10.0, 150.0) {
            TradeOutcome::Opened(position) => {
                assert_eq!(position.quantity, 10.0);
                assert_eq!(position.cost_basis, 150.0);
                assert_eq!(position.current_price, 150.0);
                assert!((position.market_value - 1_500.0).abs() < 1e-9);
                assert_eq!(position.total_gain_loss, 0.0);
            }
            other => panic!("expected Opened, got {other:?}"),
        }
    }

    #[test]
    fn second_buy_takes_quantity_weighted_average() {
        let first = match buy(None, 10.0, 100.0) {
            TradeOutcome::Opened(p) => p,
            other => panic!("expected Opened, got {other:?}"),
        };
        match buy(Some(first), 30.0, 200.0) {
            TradeOutcome::Updated(position) => {
                assert_eq!(position.quantity, 40.0);
                // (10*100 + 30*200) / 40 = 175
                assert!((position.cost_basis - 175.0).abs() < 1e-9);
                assert_eq!(position.current_price, 200.0);
            }
            other => panic!("expected Updated, got {other:?}"),
        }
    }

    #[test]
    fn sell_to_zero_closes_the_position() {
        let user = Uuid::new_v4();
        let position = Position::open(user, "TSLA", "Tesla Inc.", 50.0, 200.0, 248.5);
        let id = position.id;
        let outcome = settle_trade(
            Some(position),
            user,
            "TSLA",
            "Tesla Inc.",
            TradeSide::Sell,
            50.0,
            250.0,
        )
        .unwrap();
        match outcome {
            TradeOutcome::Closed {
                position_id,
                filled,
            } => {
                assert_eq!(position_id, id);
                assert_eq!(filled, 50.0);
            }
            other => panic!("expected Closed, got {other:?}"),
        }
    }

    #[test]
    fn oversized_sell_clamps_to_held_quantity() {
        let user = Uuid::new_v4();
        let position = Position::open(user, "MSFT", "Microsoft Corp.", 75.0, 300.0, 417.3);
        let outcome = settle_trade(
            Some(position),
            user,
            "MSFT",
            "Microsoft Corp.",
            TradeSide::Sell,
            1_000.0,
            420.0,
        )
        .unwrap();
        match outcome {
            TradeOutcome::Closed { filled, .. } => assert_eq!(filled, 75.0),
            other => panic!("expected Closed, got {other:?}"),
        }
    }

    #[test]
    fn partial_sell_keeps_cost_basis() {
        let user = Uuid::new_v4();
        let position = Position::open(user, "MSFT", "Microsoft Corp.", 75.0, 300.0, 417.3);
        let outcome = settle_trade(
            Some(position),
            user,
            "MSFT",
            "Microsoft Corp.",
            TradeSide::Sell,
            25.0,
            420.0,
        )
        .unwrap();
        match outcome {
            TradeOutcome::Updated(position) => {
                assert_eq!(position.quantity, 50.0);
                assert_eq!(position.cost_basis, 300.0);
                assert_eq!(position.current_price, 420.0);
                assert!((position.market_value - 21_000.0).abs() < 1e-9);
            }
            other => panic!("expected Updated, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_positive_input() {
        let user = Uuid::new_v4();
        let err = settle_trade(None, user, "AAPL", "Apple Inc.", TradeSide::Buy, 0.0, 100.0)
            .unwrap_err();
        assert_eq!(err, TradeError::NonPositiveQuantity);

        let err = settle_trade(None, user, "AAPL", "Apple Inc.", TradeSide::Buy, 1.0, -5.0)
            .unwrap_err();
        assert_eq!(err, TradeError::NonPositivePrice);
    }

    #[test]
    fn sell_with_no_holding_is_an_error() {
        let err = settle_trade(
            None,
            Uuid::new_v4(),
            "NVDA",
            "NVIDIA Corp.",
            TradeSide::Sell,
            5.0,
            900.0,
        )
        .unwrap_err();
        assert_eq!(
            err,
            TradeError::NoPosition {
                symbol: "NVDA".to_string()
            }
        );
    }
}
