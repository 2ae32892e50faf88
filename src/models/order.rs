//! # models::order
//!
//! Order request / order record types and the order status machine.
//!
//! ```text
//! MARKET ───────────────▶ COMPLETED
//! LIMIT | SL | SL-M ──▶ PENDING ──┬─▶ COMPLETED
//!                                  ├─▶ REJECTED
//!                                  └─▶ CANCELLED
//! ```
//!
//! Every status except `PENDING` is terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Side ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// The side that closes exposure opened by `self`.
    pub fn opposite(self) -> Self {
        match self {
            OrderSide::Buy  => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }

    /// `+1` for buys, `-1` for sells.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            OrderSide::Buy  => 1,
            OrderSide::Sell => -1,
        }
    }

    /// `qty` as signed exposure, or `None` when it does not fit an `i64`.
    pub fn signed(self, qty: u64) -> Option<i64> {
        i64::try_from(qty).ok()?.checked_mul(self.sign())
    }
}

// ─── Kind ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKind {
    #[serde(rename = "MARKET")]
    Market,
    #[serde(rename = "LIMIT")]
    Limit,
    /// Stop-loss limit.
    #[serde(rename = "SL")]
    Stop,
    /// Stop-loss market.
    #[serde(rename = "SL-M")]
    StopMarket,
}

impl OrderKind {
    /// Market orders fill synchronously; everything else waits for the
    /// delayed resolution.
    #[inline]
    pub fn fills_immediately(self) -> bool {
        matches!(self, OrderKind::Market)
    }

    /// Whether the order carries its own limit price.
    pub fn takes_price(self) -> bool {
        matches!(self, OrderKind::Limit | OrderKind::Stop)
    }

    pub fn takes_trigger(self) -> bool {
        matches!(self, OrderKind::Stop | OrderKind::StopMarket)
    }
}

// ─── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Completed,
    Rejected,
    Cancelled,
}

impl OrderStatus {
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

// ─── Request ──────────────────────────────────────────────────────────────────

/// What a caller asks the order engine to do.  Nothing here is validated by
/// the engine itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub symbol: String,
    #[serde(rename = "type")]
    pub side: OrderSide,
    #[serde(rename = "orderType")]
    pub kind: OrderKind,
    pub quantity: u64,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub trigger_price: Option<f64>,
}

impl OrderRequest {
    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: u64) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            kind: OrderKind::Market,
            quantity,
            price: None,
            trigger_price: None,
        }
    }

    pub fn limit(symbol: impl Into<String>, side: OrderSide, quantity: u64, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            kind: OrderKind::Limit,
            quantity,
            price: Some(price),
            trigger_price: None,
        }
    }
}

// ─── Order ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// `ORD{epoch millis}`.
    pub id: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub side: OrderSide,
    #[serde(rename = "orderType")]
    pub kind: OrderKind,
    pub quantity: u64,
    /// Resolved price: the caller's, else the LTP at placement, else `0`.
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_price: Option<f64>,
    pub status: OrderStatus,
    pub filled_qty: u64,
    #[serde(rename = "time")]
    pub placed_at: DateTime<Utc>,
}

impl Order {
    /// `price * quantity`, the amount a fill moves between used and
    /// available margin.
    #[inline]
    pub fn value(&self) -> f64 {
        self.price * self.quantity as f64
    }
}
