//! # models::holding
//!
//! Long-term [`Holding`]s and the portfolio-wide [`HoldingsSummary`].
//! Holdings are only ever revalued by price ticks; the order engine does not
//! feed them.

use serde::{Deserialize, Serialize};

use crate::models::percent_of;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub symbol: String,
    pub qty: u64,
    pub avg_price: f64,
    pub ltp: f64,
    pub current_value: f64,
    pub invested: f64,
    pub pnl: f64,
    /// `None` while `invested` is zero.
    pub pnl_percent: Option<f64>,
    pub day_change: f64,
    /// `None` while the instrument's open is zero.
    pub day_change_percent: Option<f64>,
}

impl Holding {
    /// A holding bought at `avg_price`, initially marked at `ltp` against a
    /// session open of `open`.
    pub fn new(symbol: impl Into<String>, qty: u64, avg_price: f64, ltp: f64, open: f64) -> Self {
        let mut holding = Self {
            symbol: symbol.into(),
            qty,
            avg_price,
            ltp,
            current_value: 0.0,
            invested: avg_price * qty as f64,
            pnl: 0.0,
            pnl_percent: None,
            day_change: 0.0,
            day_change_percent: None,
        };
        holding.revalue(ltp, open);
        holding
    }

    pub fn revalue(&mut self, ltp: f64, open: f64) {
        let qty = self.qty as f64;

        self.ltp                = ltp;
        self.current_value      = ltp * qty;
        self.pnl                = self.current_value - self.invested;
        self.pnl_percent        = percent_of(self.pnl, self.invested);
        self.day_change         = (ltp - open) * qty;
        self.day_change_percent = percent_of(ltp - open, open);
    }
}

// ─── Summary ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsSummary {
    pub total_invested: f64,
    pub total_current: f64,
    pub total_pnl: f64,
    pub total_pnl_percent: Option<f64>,
    pub total_day_change: f64,
    /// Day change relative to yesterday's value, `current - day_change`.
    pub total_day_change_percent: Option<f64>,
}

impl HoldingsSummary {
    pub fn from_holdings(holdings: &[Holding]) -> Self {
        let total_invested: f64   = holdings.iter().map(|h| h.invested).sum();
        let total_current: f64    = holdings.iter().map(|h| h.current_value).sum();
        let total_pnl: f64        = holdings.iter().map(|h| h.pnl).sum();
        let total_day_change: f64 = holdings.iter().map(|h| h.day_change).sum();

        Self {
            total_invested,
            total_current,
            total_pnl,
            total_pnl_percent: percent_of(total_pnl, total_invested),
            total_day_change,
            total_day_change_percent: percent_of(total_day_change, total_current - total_day_change),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revalue_marks_to_market() {
        let holding = Holding::new("INFY", 50, 1480.0, 1542.0, 1540.0);

        assert_eq!(holding.invested, 74_000.0);
        assert_eq!(holding.current_value, 77_100.0);
        assert_eq!(holding.pnl, 3_100.0);
        assert_eq!(holding.day_change, 100.0);
        assert!(holding.pnl_percent.is_some());
    }

    #[test]
    fn zero_invested_has_no_pnl_percent() {
        let holding = Holding::new("BONUS", 10, 0.0, 25.0, 24.0);
        assert_eq!(holding.pnl, 250.0);
        assert_eq!(holding.pnl_percent, None);
    }

    #[test]
    fn zero_open_has_no_day_change_percent() {
        let mut holding = Holding::new("NEW", 5, 10.0, 12.0, 0.0);
        assert_eq!(holding.day_change, 60.0);
        assert_eq!(holding.day_change_percent, None);

        holding.revalue(12.0, 10.0);
        assert_eq!(holding.day_change_percent, Some(20.0));
    }

    #[test]
    fn empty_summary_has_no_percentages() {
        let summary = HoldingsSummary::from_holdings(&[]);
        assert_eq!(summary.total_invested, 0.0);
        assert_eq!(summary.total_pnl_percent, None);
        assert_eq!(summary.total_day_change_percent, None);
    }

    #[test]
    fn summary_sums_rows() {
        let rows = [
            Holding::new("A", 10, 100.0, 110.0, 105.0),
            Holding::new("B", 20, 50.0, 45.0, 50.0),
        ];
        let summary = HoldingsSummary::from_holdings(&rows);

        assert_eq!(summary.total_invested, 2_000.0);
        assert_eq!(summary.total_current, 2_000.0);
        assert_eq!(summary.total_pnl, 0.0);
        assert_eq!(summary.total_day_change, -50.0);
        assert_eq!(summary.total_pnl_percent, Some(0.0));
    }
}
