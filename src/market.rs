//! # market
//!
//! [`Market`]: the service object that owns the whole simulated session and
//! is handed, by clone, to whoever needs it (HTTP handlers, the WS stream,
//! scheduled tasks).  It replaces a module-level singleton.
//!
//! ## Execution model
//!
//! Every method is synchronous and runs to completion.  State lives behind a
//! single `Mutex`; the lock is dropped before any subscriber is notified, so
//! listeners may freely call the query accessors.  In the binary all work
//! runs on a current-thread Tokio runtime, so timer callbacks and API calls
//! never overlap.
//!
//! ```text
//! tick ──▶ step prices ──▶ revalue positions ──▶ revalue holdings ──▶ publish
//! place_order ──▶ engine ──▶ publish ──▶ (non-market) fill_delay ──▶ resolve ──▶ publish
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::book::Book;
use crate::bus::{EventBus, Subscription};
use crate::catalog;
use crate::config::MarketConfig;
use crate::engine::orders::{self, Resolution};
use crate::engine::{revaluation, simulator};
use crate::events::{Channel, MarketEvent};
use crate::models::{
    Funds, Holding, HoldingsSummary, Instrument, MarketDepth, Order, OrderRequest, OrderStatus,
    Position, PositionsSummary,
};
use crate::scheduler::{Scheduler, TaskHandle};

struct Session {
    book:       Book,
    rng:        StdRng,
    tick_count: u64,
}

// ─── Market ───────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Market {
    session:   Arc<Mutex<Session>>,
    bus:       EventBus,
    scheduler: Arc<dyn Scheduler>,
    config:    Arc<MarketConfig>,
}

impl Market {
    /// A market over a caller-supplied book.
    pub fn new(config: MarketConfig, book: Book, scheduler: Arc<dyn Scheduler>) -> Self {
        let rng = seeded_rng(config.seed);
        Self::assemble(config, book, rng, scheduler)
    }

    /// A market over the default session from [`catalog`].  The opening
    /// quotes are drawn from the same RNG that later drives the simulation.
    pub fn with_default_book(config: MarketConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        let mut rng = seeded_rng(config.seed);
        let book = catalog::default_book(&mut rng, config.spread);
        Self::assemble(config, book, rng, scheduler)
    }

    fn assemble(config: MarketConfig, book: Book, rng: StdRng, scheduler: Arc<dyn Scheduler>) -> Self {
        info!(
            instruments = book.instruments().len(),
            positions   = book.positions.len(),
            holdings    = book.holdings.len(),
            seed        = ?config.seed,
            "market session created"
        );
        Self {
            session: Arc::new(Mutex::new(Session { book, rng, tick_count: 0 })),
            bus: EventBus::new(),
            scheduler,
            config: Arc::new(config),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(&self, outbox: Vec<MarketEvent>) {
        for event in &outbox {
            self.bus.publish(event);
        }
    }

    // ── Subscriptions ─────────────────────────────────────────────────────────

    pub fn subscribe<F>(&self, channel: Channel, listener: F) -> Subscription
    where
        F: Fn(&MarketEvent) + Send + Sync + 'static,
    {
        self.bus.subscribe(channel, listener)
    }

    /// Every channel with something to say right now: one per instrument plus
    /// the four portfolio channels.
    pub fn channels(&self) -> Vec<Channel> {
        let mut channels: Vec<Channel> = self
            .lock()
            .book
            .instruments()
            .iter()
            .map(|inst| Channel::Stock(inst.symbol.clone()))
            .collect();
        channels.extend([Channel::Positions, Channel::Holdings, Channel::Orders, Channel::Funds]);
        channels
    }

    // ── Simulation ────────────────────────────────────────────────────────────

    /// Arms the repeating price tick.  Cancel the handle to stop it.
    pub fn start(&self) -> TaskHandle {
        let market = self.clone();
        info!(period = ?self.config.tick_interval, "price simulation started");
        self.scheduler
            .schedule_repeating(self.config.tick_interval, Box::new(move || market.tick()))
    }

    /// One simulation step: prices, then positions, then holdings.
    pub fn tick(&self) {
        let mut outbox = Vec::new();
        {
            let mut guard = self.lock();
            let session = &mut *guard;
            simulator::step_prices(&mut session.book, &mut session.rng, &self.config, &mut outbox);
            revaluation::revalue_positions(&mut session.book, &mut outbox);
            revaluation::revalue_holdings(&mut session.book, &mut outbox);
            session.tick_count += 1;
            debug!(tick = session.tick_count, events = outbox.len(), "tick complete");
        }
        self.dispatch(outbox);
    }

    pub fn tick_count(&self) -> u64 {
        self.lock().tick_count
    }

    // ── Commands ──────────────────────────────────────────────────────────────

    /// Places an order.  Market orders come back `COMPLETED`; anything else
    /// comes back `PENDING` and resolves after `fill_delay`.
    pub fn place_order(&self, request: OrderRequest) -> Order {
        let now = self.scheduler.now();
        let mut outbox = Vec::new();
        let order = orders::place(&mut self.lock().book, &request, now, &mut outbox);

        if order.status == OrderStatus::Pending {
            let market = self.clone();
            let id = order.id.clone();
            self.scheduler.schedule_once(
                self.config.fill_delay,
                Box::new(move || {
                    market.resolve_order(&id);
                }),
            );
        }

        self.dispatch(outbox);
        order
    }

    fn resolve_order(&self, id: &str) -> Option<OrderStatus> {
        let mut outbox = Vec::new();
        let status = {
            let mut guard = self.lock();
            let session = &mut *guard;
            let outcome = if session.rng.gen::<f64>() < self.config.fill_probability {
                Resolution::Fill
            } else {
                Resolution::Reject
            };
            orders::resolve(&mut session.book, id, outcome, &mut outbox)
        };
        self.dispatch(outbox);
        status
    }

    /// `true` only when the order was `PENDING`.
    pub fn cancel_order(&self, id: &str) -> bool {
        let mut outbox = Vec::new();
        let cancelled = orders::cancel(&mut self.lock().book, id, &mut outbox);
        self.dispatch(outbox);
        cancelled
    }

    /// `None` when there is no open position in `symbol`.
    pub fn square_off_position(&self, symbol: &str) -> Option<Order> {
        let now = self.scheduler.now();
        let mut outbox = Vec::new();
        let order = orders::square_off(&mut self.lock().book, symbol, now, &mut outbox);
        self.dispatch(outbox);
        order
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    pub fn instrument(&self, symbol: &str) -> Option<Instrument> {
        self.lock().book.instrument(symbol).cloned()
    }

    pub fn instruments(&self) -> Vec<Instrument> {
        self.lock().book.instruments().to_vec()
    }

    pub fn positions(&self) -> Vec<Position> {
        self.lock().book.positions.clone()
    }

    pub fn positions_summary(&self) -> PositionsSummary {
        PositionsSummary::from_positions(&self.lock().book.positions)
    }

    pub fn holdings(&self) -> Vec<Holding> {
        self.lock().book.holdings.clone()
    }

    pub fn holdings_summary(&self) -> HoldingsSummary {
        HoldingsSummary::from_holdings(&self.lock().book.holdings)
    }

    /// Newest first.
    pub fn orders(&self) -> Vec<Order> {
        self.lock().book.orders.clone()
    }

    pub fn order(&self, id: &str) -> Option<Order> {
        self.lock().book.order(id).cloned()
    }

    pub fn funds(&self) -> Funds {
        self.lock().book.funds.clone()
    }

    /// A fresh synthetic ladder on every call; empty for unknown symbols.
    pub fn market_depth(&self, symbol: &str) -> MarketDepth {
        let mut guard = self.lock();
        let session = &mut *guard;
        simulator::market_depth(
            session.book.instrument(symbol),
            &mut session.rng,
            self.config.depth_levels,
            self.config.depth_step,
        )
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::{OrderKind, OrderSide};
    use crate::scheduler::ManualScheduler;

    fn demo_book() -> Book {
        Book::new(Funds::with_balance(50_000.0))
            .with_instrument(Instrument::flat("DEMO", 100.0, 0.05))
            .with_position(Position::new("DEMO", 10, 95.0, 100.0))
            .with_holding(Holding::new("DEMO", 20, 80.0, 100.0, 100.0))
    }

    fn market_with(config: MarketConfig) -> (Market, Arc<ManualScheduler>) {
        let sched = Arc::new(ManualScheduler::default());
        let market = Market::new(config, demo_book(), sched.clone());
        (market, sched)
    }

    fn market() -> (Market, Arc<ManualScheduler>) {
        market_with(MarketConfig::default().with_seed(7))
    }

    fn collect(market: &Market, channel: Channel) -> (Arc<Mutex<Vec<MarketEvent>>>, Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = market.subscribe(channel, move |event| sink.lock().unwrap().push(event.clone()));
        (seen, sub)
    }

    #[test]
    fn started_market_ticks_every_second() {
        let (market, sched) = market();
        let (stocks, _sub) = collect(&market, Channel::Stock("DEMO".into()));

        let handle = market.start();
        sched.advance(Duration::from_millis(3_200));
        assert_eq!(market.tick_count(), 3);
        assert_eq!(stocks.lock().unwrap().len(), 3);

        handle.cancel();
        sched.advance(Duration::from_secs(10));
        assert_eq!(market.tick_count(), 3);
    }

    #[test]
    fn tick_keeps_demo_within_session_bracket() {
        let (market, _sched) = market();
        market.tick();

        let demo = market.instrument("DEMO").unwrap();
        assert!(demo.high >= demo.ltp.max(100.0));
        assert!(demo.low <= demo.ltp.min(100.0));
        assert_eq!(demo.change, demo.ltp - 100.0);
    }

    #[test]
    fn tick_revalues_positions_and_holdings() {
        let (market, _sched) = market();
        let (positions, _p) = collect(&market, Channel::Positions);
        let (holdings, _h) = collect(&market, Channel::Holdings);

        market.tick();
        let ltp = market.instrument("DEMO").unwrap().ltp;

        let pos = &market.positions()[0];
        assert_eq!(pos.pnl, (ltp - 95.0) * 10.0);
        let holding = &market.holdings()[0];
        assert_eq!(holding.current_value, ltp * 20.0);
        assert_eq!(holding.pnl, holding.current_value - holding.invested);

        assert_eq!(positions.lock().unwrap().len(), 1);
        assert_eq!(holdings.lock().unwrap().len(), 1);
    }

    #[test]
    fn market_buy_moves_margin_immediately() {
        let (market, _sched) = market();
        let (funds, _sub) = collect(&market, Channel::Funds);

        let order = market.place_order(OrderRequest::market("DEMO", OrderSide::Buy, 4));

        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.filled_qty, 4);
        let after = market.funds();
        assert_eq!(after.used_margin, 400.0);
        assert_eq!(after.available_margin, 49_600.0);
        assert_eq!(*funds.lock().unwrap(), vec![MarketEvent::Funds(after)]);
    }

    #[test]
    fn limit_order_resolves_after_fill_delay() {
        let (market, sched) = market();
        let (orders, _sub) = collect(&market, Channel::Orders);

        let order = market.place_order(OrderRequest::limit("DEMO", OrderSide::Buy, 2, 99.0));
        assert_eq!(order.status, OrderStatus::Pending);

        sched.advance(Duration::from_millis(1_999));
        assert_eq!(market.order(&order.id).unwrap().status, OrderStatus::Pending);

        sched.advance(Duration::from_millis(1));
        let status = market.order(&order.id).unwrap().status;
        assert!(matches!(status, OrderStatus::Completed | OrderStatus::Rejected));
        assert_eq!(orders.lock().unwrap().len(), 2);

        sched.advance(Duration::from_secs(10));
        assert_eq!(market.order(&order.id).unwrap().status, status);
    }

    #[test]
    fn stop_orders_wait_like_limits() {
        let config = MarketConfig { fill_probability: 1.0, ..MarketConfig::default().with_seed(4) };
        let (market, sched) = market_with(config);

        let stop = market.place_order(OrderRequest {
            kind: OrderKind::Stop,
            trigger_price: Some(99.5),
            ..OrderRequest::limit("DEMO", OrderSide::Sell, 2, 99.0)
        });
        let stop_market = market.place_order(OrderRequest {
            kind: OrderKind::StopMarket,
            trigger_price: Some(99.5),
            ..OrderRequest::market("DEMO", OrderSide::Sell, 3)
        });

        for order in [&stop, &stop_market] {
            assert_eq!(order.status, OrderStatus::Pending);
            assert_eq!(order.filled_qty, 0);
        }
        assert_eq!(stop_market.price, 100.0);
        assert_eq!(market.funds().used_margin, 0.0);

        sched.advance(Duration::from_secs(2));

        assert_eq!(market.order(&stop.id).unwrap().status, OrderStatus::Completed);
        assert_eq!(market.order(&stop_market.id).unwrap().filled_qty, 3);
        assert_eq!(market.funds().used_margin, -(2.0 * 99.0 + 3.0 * 100.0));
        assert_eq!(market.positions()[0].qty, 5);
        assert_eq!(market.positions_summary().open, 1);
    }

    #[test]
    fn fill_probability_decides_outcome() {
        let always = MarketConfig { fill_probability: 1.0, ..MarketConfig::default().with_seed(1) };
        let never = MarketConfig { fill_probability: 0.0, ..MarketConfig::default().with_seed(1) };

        for (config, expected) in [(always, OrderStatus::Completed), (never, OrderStatus::Rejected)] {
            let (market, sched) = market_with(config);
            let order = market.place_order(OrderRequest::limit("DEMO", OrderSide::Sell, 1, 101.0));
            sched.advance(Duration::from_secs(2));
            assert_eq!(market.order(&order.id).unwrap().status, expected);
        }
    }

    #[test]
    fn delayed_fill_books_funds() {
        let config = MarketConfig { fill_probability: 1.0, ..MarketConfig::default() };
        let (market, sched) = market_with(config);

        market.place_order(OrderRequest::limit("DEMO", OrderSide::Buy, 10, 99.0));
        assert_eq!(market.funds().used_margin, 0.0);

        sched.advance(Duration::from_secs(2));
        assert_eq!(market.funds().used_margin, 990.0);
        assert_eq!(market.positions()[0].qty, 20);
    }

    #[test]
    fn seeded_outcomes_are_reproducible() {
        let run = || {
            let (market, sched) = market_with(MarketConfig::default().with_seed(99));
            for _ in 0..30 {
                market.place_order(OrderRequest::limit("DEMO", OrderSide::Buy, 1, 99.0));
            }
            sched.advance(Duration::from_secs(2));
            market.orders().into_iter().map(|o| o.status).collect::<Vec<_>>()
        };

        let first = run();
        assert!(first.iter().all(|s| *s != OrderStatus::Pending));
        assert_eq!(first, run());
    }

    #[test]
    fn cancelled_order_survives_its_timer() {
        let (market, sched) = market();
        let order = market.place_order(OrderRequest::limit("DEMO", OrderSide::Buy, 1, 99.0));

        assert!(market.cancel_order(&order.id));
        sched.advance(Duration::from_secs(2));

        assert_eq!(market.order(&order.id).unwrap().status, OrderStatus::Cancelled);
        assert!(!market.cancel_order(&order.id));
    }

    #[test]
    fn square_off_closes_position() {
        let (market, _sched) = market();
        let (positions, _sub) = collect(&market, Channel::Positions);

        assert!(market.square_off_position("NOPE").is_none());
        assert!(positions.lock().unwrap().is_empty());

        let order = market.square_off_position("DEMO").unwrap();
        assert_eq!(order.side, OrderSide::Sell);
        assert_eq!(order.quantity, 10);
        assert!(market.positions().is_empty());
        assert_eq!(positions.lock().unwrap().last(), Some(&MarketEvent::Positions(Vec::new())));
    }

    #[test]
    fn listeners_can_query_the_market() {
        let (market, _sched) = market();
        let seen = Arc::new(Mutex::new(None));
        let (sink, inner) = (Arc::clone(&seen), market.clone());
        let _sub = market.subscribe(Channel::Funds, move |_| {
            *sink.lock().unwrap() = Some(inner.funds().used_margin);
        });

        market.place_order(OrderRequest::market("DEMO", OrderSide::Buy, 1));
        assert_eq!(*seen.lock().unwrap(), Some(100.0));
    }

    #[test]
    fn depth_is_fresh_each_call_and_empty_when_unknown() {
        let (market, _sched) = market();
        let a = market.market_depth("DEMO");
        let b = market.market_depth("DEMO");

        assert_eq!(a.bids.len(), 5);
        assert_eq!(a.bids[0].price, b.bids[0].price);
        assert_ne!(a, b);
        assert!(market.market_depth("NOPE").is_empty());
    }

    #[test]
    fn default_book_exposes_all_channels() {
        let sched = Arc::new(ManualScheduler::default());
        let market = Market::with_default_book(MarketConfig::default().with_seed(3), sched);

        assert_eq!(market.instruments().len(), catalog::INSTRUMENTS.len());
        assert_eq!(market.channels().len(), catalog::INSTRUMENTS.len() + 4);
        assert_eq!(market.funds(), catalog::opening_funds());
    }
}
