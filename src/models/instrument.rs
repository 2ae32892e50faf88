//! # models::instrument
//!
//! Defines [`Instrument`], the live quote row the simulator owns for every
//! tradable symbol.  Created once when the book is seeded and mutated in
//! place on every tick; instruments are never removed during a session.

use serde::{Deserialize, Serialize};

/// A tradable symbol and its session statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    /// Unique key, e.g. `"RELIANCE"`, `"NIFTY 50"`.
    pub symbol: String,

    /// Last traded price.
    pub ltp: f64,

    /// `ltp - open`.
    pub change: f64,

    /// `change / open * 100`.
    pub change_percent: f64,

    /// Cumulative session volume.
    pub volume: u64,

    pub high:  f64,
    pub low:   f64,
    pub open:  f64,
    pub close: f64,

    pub bid:     f64,
    pub ask:     f64,
    pub bid_qty: u64,
    pub ask_qty: u64,
}

impl Instrument {
    /// A flat instrument: every price field equals `price` and nothing has
    /// traded yet.
    pub fn flat(symbol: impl Into<String>, price: f64, spread: f64) -> Self {
        Self {
            symbol:         symbol.into(),
            ltp:            price,
            change:         0.0,
            change_percent: 0.0,
            volume:         0,
            high:           price,
            low:            price,
            open:           price,
            close:          price,
            bid:            price - spread,
            ask:            price + spread,
            bid_qty:        0,
            ask_qty:        0,
        }
    }

    /// Moves the last traded price to `price` and recomputes every field
    /// derived from it.
    pub fn reprice(&mut self, price: f64, spread: f64) {
        self.ltp            = price;
        self.change         = price - self.open;
        self.change_percent = self.change / self.open * 100.0;
        self.high           = self.high.max(price);
        self.low            = self.low.min(price);
        self.bid            = price - spread;
        self.ask            = price + spread;
    }
}
