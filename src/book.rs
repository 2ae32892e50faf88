//! # book
//!
//! [`Book`]: every piece of simulator state in one place: the instrument
//! table, open positions, holdings, the order blotter and the funds pool.
//!
//! The book holds no locks and no timers.  The engine functions mutate it and
//! report what changed as [`MarketEvent`]s; the `Market` service decides when
//! those get published.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::events::MarketEvent;
use crate::models::{Funds, Holding, Instrument, Order, Position};

#[derive(Debug, Clone)]
pub struct Book {
    instruments:   Vec<Instrument>,
    index:         HashMap<String, usize>,
    pub positions: Vec<Position>,
    pub holdings:  Vec<Holding>,
    /// Newest first.
    pub orders:    Vec<Order>,
    pub funds:     Funds,
    last_order_ms: i64,
}

impl Book {
    pub fn new(funds: Funds) -> Self {
        Self {
            instruments:   Vec::new(),
            index:         HashMap::new(),
            positions:     Vec::new(),
            holdings:      Vec::new(),
            orders:        Vec::new(),
            funds,
            last_order_ms: i64::MIN,
        }
    }

    /// Adds an instrument, replacing any existing row with the same symbol.
    pub fn list(&mut self, instrument: Instrument) {
        match self.index.get(&instrument.symbol) {
            Some(&idx) => self.instruments[idx] = instrument,
            None => {
                self.index.insert(instrument.symbol.clone(), self.instruments.len());
                self.instruments.push(instrument);
            }
        }
    }

    pub fn with_instrument(mut self, instrument: Instrument) -> Self {
        self.list(instrument);
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.positions.push(position);
        self
    }

    pub fn with_holding(mut self, holding: Holding) -> Self {
        self.holdings.push(holding);
        self
    }

    // ── Instruments ───────────────────────────────────────────────────────────

    pub fn instrument(&self, symbol: &str) -> Option<&Instrument> {
        self.index.get(symbol).map(|&idx| &self.instruments[idx])
    }

    /// In listing order.
    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn instruments_mut(&mut self) -> &mut [Instrument] {
        &mut self.instruments
    }

    pub fn ltp(&self, symbol: &str) -> Option<f64> {
        self.instrument(symbol).map(|inst| inst.ltp)
    }

    // ── Positions ─────────────────────────────────────────────────────────────

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.symbol == symbol)
    }

    /// Drops the open position for `symbol`; `false` if there was none.
    pub fn close_position(&mut self, symbol: &str) -> bool {
        let before = self.positions.len();
        self.positions.retain(|p| p.symbol != symbol);
        self.positions.len() != before
    }

    // ── Orders ────────────────────────────────────────────────────────────────

    pub fn order(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn order_mut(&mut self, id: &str) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| o.id == id)
    }

    /// `ORD{epoch millis}`, bumped forward when two orders land in the same
    /// millisecond so ids stay unique and increasing.
    pub fn next_order_id(&mut self, now: DateTime<Utc>) -> String {
        let millis = now.timestamp_millis().max(self.last_order_ms.saturating_add(1));
        self.last_order_ms = millis;
        format!("ORD{millis}")
    }

    // ── Snapshots ─────────────────────────────────────────────────────────────

    pub fn positions_event(&self) -> MarketEvent {
        MarketEvent::Positions(self.positions.clone())
    }

    pub fn holdings_event(&self) -> MarketEvent {
        MarketEvent::Holdings(self.holdings.clone())
    }

    pub fn orders_event(&self) -> MarketEvent {
        MarketEvent::Orders(self.orders.clone())
    }

    pub fn funds_event(&self) -> MarketEvent {
        MarketEvent::Funds(self.funds.clone())
    }
}
