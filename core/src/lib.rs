//! # FinCanvas Core
//!
//! Domain types and business logic for the FinCanvas demo backend:
//! - `types`: persisted documents (positions, market entries, price bars,
//!   portfolio history points, insights, the demo user profile) and the
//!   dashboard time ranges
//! - `trade`: demo trade settlement (open, weighted-average buy, reduce,
//!   close) with derived gain/loss fields refreshed on every mutation
//! - `canvas`: the analysis-canvas session engine (annotations, padded
//!   bounding-box hit-testing, pointer-driven draw/select/move/erase, and
//!   canned AI replies)

pub mod canvas;
pub mod trade;
pub mod types;

pub use trade::{settle_trade, TradeError, TradeOutcome};
pub use types::*;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
