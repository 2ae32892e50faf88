//! # engine::revaluation
//!
//! **Position/Holding Recalculator**: runs inside the tick, after prices
//! move, and marks every position and holding to the new LTPs.  Rows whose
//! symbol is not listed keep their last values.

use crate::book::Book;
use crate::events::MarketEvent;

pub fn revalue_positions(book: &mut Book, outbox: &mut Vec<MarketEvent>) {
    let marks: Vec<Option<f64>> = book.positions.iter().map(|p| book.ltp(&p.symbol)).collect();
    for (pos, mark) in book.positions.iter_mut().zip(marks) {
        if let Some(ltp) = mark {
            pos.revalue(ltp);
        }
    }
    outbox.push(book.positions_event());
}

pub fn revalue_holdings(book: &mut Book, outbox: &mut Vec<MarketEvent>) {
    let marks: Vec<Option<(f64, f64)>> = book
        .holdings
        .iter()
        .map(|h| book.instrument(&h.symbol).map(|inst| (inst.ltp, inst.open)))
        .collect();
    for (holding, mark) in book.holdings.iter_mut().zip(marks) {
        if let Some((ltp, open)) = mark {
            holding.revalue(ltp, open);
        }
    }
    outbox.push(book.holdings_event());
}
