//! # models::depth
//!
//! Synthetic order-book ladder.  Built fresh on every request from the
//! instrument's LTP; never cached.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub price:    f64,
    pub quantity: u64,
    pub orders:   u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketDepth {
    /// Best bid first, descending.
    pub bids: Vec<DepthLevel>,
    /// Best ask first, ascending.
    pub asks: Vec<DepthLevel>,
}

impl MarketDepth {
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}
