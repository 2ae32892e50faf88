//! # events
//!
//! Defines [`Channel`], the closed set of topics subscribers can listen on,
//! and [`MarketEvent`], the snapshot payload published on each of them.
//!
//! Channels keep the textual names the dashboard always used
//! (`stock:{symbol}`, `positions`, `holdings`, `orders`, `funds`) so the WS
//! stream can accept them verbatim.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::models::{Funds, Holding, Instrument, Order, Position};

// ─── Channel ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    /// Quote updates for a single instrument.
    Stock(String),
    Positions,
    Holdings,
    Orders,
    Funds,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Stock(symbol) => write!(f, "stock:{symbol}"),
            Channel::Positions     => f.write_str("positions"),
            Channel::Holdings      => f.write_str("holdings"),
            Channel::Orders        => f.write_str("orders"),
            Channel::Funds         => f.write_str("funds"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown channel '{0}'")]
pub struct UnknownChannel(pub String);

impl FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "positions" => Ok(Channel::Positions),
            "holdings"  => Ok(Channel::Holdings),
            "orders"    => Ok(Channel::Orders),
            "funds"     => Ok(Channel::Funds),
            _ => match s.strip_prefix("stock:") {
                Some(symbol) if !symbol.is_empty() => Ok(Channel::Stock(symbol.to_string())),
                _ => Err(UnknownChannel(s.to_string())),
            },
        }
    }
}

// ─── MarketEvent ──────────────────────────────────────────────────────────────

/// Every snapshot the service publishes.  List-valued events always carry the
/// full current list, never a delta.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketEvent {
    Stock(Instrument),
    Positions(Vec<Position>),
    Holdings(Vec<Holding>),
    Orders(Vec<Order>),
    Funds(Funds),
}

impl MarketEvent {
    /// The channel this event is delivered on.
    pub fn channel(&self) -> Channel {
        match self {
            MarketEvent::Stock(inst)   => Channel::Stock(inst.symbol.clone()),
            MarketEvent::Positions(_)  => Channel::Positions,
            MarketEvent::Holdings(_)   => Channel::Holdings,
            MarketEvent::Orders(_)     => Channel::Orders,
            MarketEvent::Funds(_)      => Channel::Funds,
        }
    }

    /// Serialises to a WebSocket text frame, tagged with its channel name.
    pub fn to_json(&self) -> String {
        let mut value = match serde_json::to_value(self) {
            Ok(value) => value,
            Err(_) => return r#"{"event":"SERIALIZATION_ERROR"}"#.to_string(),
        };
        if let Some(obj) = value.as_object_mut() {
            obj.insert("channel".into(), self.channel().to_string().into());
        }
        value.to_string()
    }
}
