//! # models::position
//!
//! Intraday [`Position`]s: signed exposure opened by order fills and closed
//! by square-off.  Long-term holdings live in [`super::holding`].

use serde::{Deserialize, Serialize};

use crate::models::OrderSide;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: String,
    /// Positive = long, negative = short.  Never zero while the position is
    /// in the open set.
    pub qty: i64,
    /// Average entry price.
    pub avg: f64,
    pub ltp: f64,
    /// Unrealised P&L, always `(ltp - avg) * qty`.
    pub pnl: f64,
    pub day_pnl: f64,
}

impl Position {
    pub fn new(symbol: impl Into<String>, qty: i64, avg: f64, ltp: f64) -> Self {
        let mut pos = Self {
            symbol: symbol.into(),
            qty,
            avg,
            ltp,
            pnl: 0.0,
            day_pnl: 0.0,
        };
        pos.revalue(ltp);
        pos
    }

    /// Marks the position to `ltp`.
    pub fn revalue(&mut self, ltp: f64) {
        self.ltp     = ltp;
        self.pnl     = (ltp - self.avg) * self.qty as f64;
        self.day_pnl = self.pnl;
    }

    /// The side of the fills that opened this position.
    pub fn side(&self) -> OrderSide {
        if self.qty > 0 { OrderSide::Buy } else { OrderSide::Sell }
    }

    /// The side of an order that would flatten this position.
    pub fn closing_side(&self) -> OrderSide {
        self.side().opposite()
    }

    /// Nets a fill of signed size `delta` at `price` into the position.
    ///
    /// Adding to the same direction re-weights the average; reducing keeps
    /// it; crossing through zero re-opens at the fill price.  Returns
    /// `Some(false)` once the position is flat and should leave the open set,
    /// and `None`, leaving the position untouched, when the new size would
    /// overflow.
    pub fn absorb_fill(&mut self, delta: i64, price: f64) -> Option<bool> {
        let next = self.qty.checked_add(delta)?;

        if next == 0 {
            self.qty = 0;
            return Some(false);
        }

        if self.qty.signum() == delta.signum() {
            let cost = self.avg * self.qty as f64 + price * delta as f64;
            self.avg = cost / next as f64;
        } else if next.signum() != self.qty.signum() {
            self.avg = price;
        }

        self.qty = next;
        self.revalue(self.ltp);
        Some(true)
    }
}

// ─── Summary ──────────────────────────────────────────────────────────────────

/// Totals across the open positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionsSummary {
    pub open:          usize,
    pub total_pnl:     f64,
    pub total_day_pnl: f64,
}

impl PositionsSummary {
    pub fn from_positions(positions: &[Position]) -> Self {
        Self {
            open:          positions.len(),
            total_pnl:     positions.iter().map(|p| p.pnl).sum(),
            total_day_pnl: positions.iter().map(|p| p.day_pnl).sum(),
        }
    }
}
