//! Domain models shared across the whole simulator.

pub mod depth;
pub mod funds;
pub mod holding;
pub mod instrument;
pub mod order;
pub mod position;

pub use depth::{DepthLevel, MarketDepth};
pub use funds::Funds;
pub use holding::{Holding, HoldingsSummary};
pub use instrument::Instrument;
pub use order::{Order, OrderKind, OrderRequest, OrderSide, OrderStatus};
pub use position::{Position, PositionsSummary};

/// `numerator / denominator * 100`, or `None` when the ratio is undefined.
pub(crate) fn percent_of(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    let pct = numerator / denominator * 100.0;
    pct.is_finite().then_some(pct)
}
