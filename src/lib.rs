//! # kite-sim: mock market-data and order-simulation service
//!
//! A self-contained trading session for dashboards and demos: a table of
//! instruments whose prices random-walk on a fixed tick, intraday positions
//! and long-term holdings marked to those prices, a simulated order engine
//! with margin bookkeeping, and a channel-keyed event bus that pushes every
//! change to subscribers.
//!
//! ```text
//!  Scheduler ── every tick ──▶ Market::tick ──▶ simulator ──▶ revaluation ─┐
//!      ▲                                                                   │
//!      │ fill_delay          Market::place_order ──▶ engine::orders ───────┤
//!      └──────────────────────────────────┘                                ▼
//!                                                  EventBus ──▶ stock:{symbol}
//!                                                               positions · holdings
//!                                                               orders · funds
//! ```
//!
//! The core ([`market`], [`engine`], [`bus`], [`scheduler`]) has no I/O.  The
//! [`routes`] module puts it behind Axum for the `kite-sim` binary.

pub mod book;
pub mod bus;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod market;
pub mod models;
pub mod routes;
pub mod scheduler;
pub mod state;

pub use bus::{EventBus, Subscription};
pub use config::MarketConfig;
pub use events::{Channel, MarketEvent};
pub use market::Market;
pub use scheduler::{ManualScheduler, Scheduler, TokioScheduler};
