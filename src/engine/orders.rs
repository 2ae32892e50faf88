//! # engine::orders
//!
//! **Order Engine**: placement, delayed resolution, cancellation and
//! square-off, all as plain functions over a [`Book`].
//!
//! The engine trusts its caller: quantities and prices are taken as given.
//! Timers and randomness live in the `Market` service; here a delayed order
//! is resolved with an outcome the caller already drew.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::book::Book;
use crate::events::MarketEvent;
use crate::models::{Order, OrderRequest, OrderStatus, Position};

/// Outcome of a delayed order once its timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Fill,
    Reject,
}

// ─── Fills ────────────────────────────────────────────────────────────────────

/// Books a completed order: moves margin and nets the fill into the open
/// position for its symbol.  Holdings are never touched.
fn book_fill(book: &mut Book, order: &Order, outbox: &mut Vec<MarketEvent>) {
    book.funds.apply_fill(order);
    outbox.push(book.funds_event());

    if order.filled_qty == 0 {
        return;
    }

    let Some(delta) = order.side.signed(order.filled_qty) else {
        warn!(id = %order.id, qty = order.filled_qty, "fill too large to net, position unchanged");
        return;
    };

    match book.positions.iter().position(|p| p.symbol == order.symbol) {
        Some(idx) => match book.positions[idx].absorb_fill(delta, order.price) {
            Some(true) => {}
            Some(false) => {
                book.positions.remove(idx);
            }
            None => {
                warn!(id = %order.id, symbol = %order.symbol, delta, "position size would overflow, fill not netted");
                return;
            }
        },
        None => {
            let ltp = book.ltp(&order.symbol).unwrap_or(order.price);
            book.positions.push(Position::new(order.symbol.clone(), delta, order.price, ltp));
        }
    }
    outbox.push(book.positions_event());
}

// ─── Placement ────────────────────────────────────────────────────────────────

/// Records a new order.  Market orders complete before this returns; every
/// other kind is left `PENDING` for [`resolve`].
pub fn place(
    book: &mut Book,
    request: &OrderRequest,
    now: DateTime<Utc>,
    outbox: &mut Vec<MarketEvent>,
) -> Order {
    let price = request
        .price
        .filter(|p| *p != 0.0)
        .or_else(|| book.ltp(&request.symbol))
        .unwrap_or(0.0);

    let immediate = request.kind.fills_immediately();
    let order = Order {
        id:            book.next_order_id(now),
        symbol:        request.symbol.clone(),
        side:          request.side,
        kind:          request.kind,
        quantity:      request.quantity,
        price,
        trigger_price: request.trigger_price,
        status:        if immediate { OrderStatus::Completed } else { OrderStatus::Pending },
        filled_qty:    if immediate { request.quantity } else { 0 },
        placed_at:     now,
    };

    book.orders.insert(0, order.clone());
    outbox.push(book.orders_event());

    if immediate {
        book_fill(book, &order, outbox);
    } else {
        outbox.push(book.funds_event());
    }

    info!(
        id     = %order.id,
        symbol = %order.symbol,
        side   = ?order.side,
        kind   = ?order.kind,
        qty    = order.quantity,
        price  = order.price,
        status = ?order.status,
        "order placed"
    );

    order
}

// ─── Delayed resolution ───────────────────────────────────────────────────────

/// Moves a pending order to its terminal state.  Orders that already left
/// `PENDING` (for instance cancelled in the meantime) are not touched.
pub fn resolve(
    book: &mut Book,
    id: &str,
    outcome: Resolution,
    outbox: &mut Vec<MarketEvent>,
) -> Option<OrderStatus> {
    let order = book.order_mut(id)?;
    if order.status.is_terminal() {
        debug!(id, status = ?order.status, "order already terminal, resolution skipped");
        return None;
    }

    match outcome {
        Resolution::Fill => {
            order.status     = OrderStatus::Completed;
            order.filled_qty = order.quantity;
            info!(id, symbol = %order.symbol, qty = order.quantity, "order filled");
        }
        Resolution::Reject => {
            order.status     = OrderStatus::Rejected;
            order.filled_qty = 0;
            warn!(id, symbol = %order.symbol, "order rejected");
        }
    }

    let order = order.clone();
    outbox.push(book.orders_event());
    if order.status == OrderStatus::Completed {
        book_fill(book, &order, outbox);
    }
    Some(order.status)
}

// ─── Cancellation ─────────────────────────────────────────────────────────────

/// `PENDING → CANCELLED`.  Returns `false`, changing nothing, for unknown or
/// terminal orders.
pub fn cancel(book: &mut Book, id: &str, outbox: &mut Vec<MarketEvent>) -> bool {
    let Some(order) = book.order_mut(id) else {
        debug!(id, "cancel: unknown order");
        return false;
    };
    if order.status.is_terminal() {
        debug!(id, status = ?order.status, "cancel: order not pending");
        return false;
    }

    order.status = OrderStatus::Cancelled;
    info!(id, "order cancelled");
    outbox.push(book.orders_event());
    true
}

// ─── Square-off ───────────────────────────────────────────────────────────────

/// Closes the open position in `symbol` with an offsetting market order.
/// The position leaves the open set whatever happens to that order.
pub fn square_off(
    book: &mut Book,
    symbol: &str,
    now: DateTime<Utc>,
    outbox: &mut Vec<MarketEvent>,
) -> Option<Order> {
    let position = book.position(symbol)?;
    let request = OrderRequest::market(
        symbol,
        position.closing_side(),
        position.qty.unsigned_abs(),
    );

    let order = place(book, &request, now, outbox);

    book.close_position(symbol);
    outbox.push(book.positions_event());
    info!(symbol, order_id = %order.id, "position squared off");

    Some(order)
}
