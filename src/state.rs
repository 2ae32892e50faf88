//! # state
//!
//! Shared state injected into every Axum handler.  It is only a carrier for
//! the [`Market`] service; all simulator state lives inside the market.

use std::sync::Arc;

use crate::market::Market;

#[derive(Clone)]
pub struct AppState {
    pub market: Market,
}

impl AppState {
    pub fn new(market: Market) -> Self {
        Self { market }
    }
}

/// Convenience type alias
pub type SharedState = Arc<AppState>;

pub fn build_state(market: Market) -> SharedState {
    Arc::new(AppState::new(market))
}
