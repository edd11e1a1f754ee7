//! # Document Store
//!
//! Lightweight in-memory document store for the FinCanvas demo backend.
//! One typed collection per schema table, index-style filtered scans, and
//! per-call atomicity: every mutation takes the collection's write guard
//! for the duration of the call, so a read-modify-write sequence passed
//! to [`Collection::with_write`] cannot interleave with another writer.

pub mod collection;
pub mod error;

pub use collection::{Collection, Document};
pub use error::{StoreError, StoreResult};

use fincanvas_core::{
    Insight, MarketEntry, PortfolioPoint, Position, PriceBar, UserProfile,
};
use uuid::Uuid;

impl Document for UserProfile {
    const COLLECTION: &'static str = "users";
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Document for Position {
    const COLLECTION: &'static str = "positions";
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Document for MarketEntry {
    const COLLECTION: &'static str = "market_data";
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Document for PriceBar {
    const COLLECTION: &'static str = "price_history";
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Document for PortfolioPoint {
    const COLLECTION: &'static str = "portfolio_history";
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Document for Insight {
    const COLLECTION: &'static str = "insights";
    fn id(&self) -> Uuid {
        self.id
    }
}

/// All collections of the demo schema.
#[derive(Debug, Default)]
pub struct DocumentStore {
    pub users: Collection<UserProfile>,
    pub positions: Collection<Position>,
    pub market: Collection<MarketEntry>,
    pub price_history: Collection<PriceBar>,
    pub portfolio_history: Collection<PortfolioPoint>,
    pub insights: Collection<Insight>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
