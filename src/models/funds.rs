//! # models::funds
//!
//! The single funds pool.  Used and available margin are complementary views
//! of it: every completed fill moves the order value from one to the other.

use serde::{Deserialize, Serialize};

use crate::models::{Order, OrderSide};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Funds {
    pub available_cash:   f64,
    pub used_margin:      f64,
    pub available_margin: f64,
    pub total_collateral: f64,
    pub opening_balance:  f64,
}

impl Funds {
    /// A fresh account with nothing committed.
    pub fn with_balance(balance: f64) -> Self {
        Self {
            available_cash:   balance,
            used_margin:      0.0,
            available_margin: balance,
            total_collateral: balance,
            opening_balance:  balance,
        }
    }

    /// Books a completed fill: buys consume margin, sells release it.
    pub fn apply_fill(&mut self, order: &Order) {
        let value = order.value();
        match order.side {
            OrderSide::Buy => {
                self.used_margin      += value;
                self.available_margin -= value;
            }
            OrderSide::Sell => {
                self.used_margin      -= value;
                self.available_margin += value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderKind, OrderStatus};
    use chrono::Utc;

    fn filled(side: OrderSide, quantity: u64, price: f64) -> Order {
        Order {
            id: "ORD1".into(),
            symbol: "TCS".into(),
            side,
            kind: OrderKind::Market,
            quantity,
            price,
            trigger_price: None,
            status: OrderStatus::Completed,
            filled_qty: quantity,
            placed_at: Utc::now(),
        }
    }

    #[test]
    fn buys_consume_and_sells_release_margin() {
        let mut funds = Funds::with_balance(10_000.0);

        funds.apply_fill(&filled(OrderSide::Buy, 3, 500.0));
        assert_eq!(funds.used_margin, 1_500.0);
        assert_eq!(funds.available_margin, 8_500.0);

        funds.apply_fill(&filled(OrderSide::Sell, 2, 400.0));
        assert_eq!(funds.used_margin, 700.0);
        assert_eq!(funds.available_margin, 9_300.0);

        // cash and collateral are not margin views
        assert_eq!(funds.available_cash, 10_000.0);
        assert_eq!(funds.total_collateral, 10_000.0);
    }
}
