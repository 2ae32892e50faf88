//! # engine::simulator
//!
//! **Market Simulator**: one random-walk step per instrument per tick, plus
//! the synthetic market-depth ladder.
//!
//! ```text
//! delta = (u - 0.5) * ltp * volatility      u ~ U[0, 1)
//! ltp'  = ltp + delta
//! ```
//!
//! Prices are not clamped; a long enough session can drift anywhere.

use rand::Rng;
use tracing::trace;

use crate::book::Book;
use crate::config::MarketConfig;
use crate::events::MarketEvent;
use crate::models::{DepthLevel, Instrument, MarketDepth};

/// Upper bound (exclusive) of the volume added to an instrument per tick.
pub const MAX_TICK_VOLUME: u64 = 10_000;

/// Advances one instrument by a single random-walk step.
pub fn step_instrument<R: Rng>(inst: &mut Instrument, rng: &mut R, volatility: f64, spread: f64) {
    let delta = (rng.gen::<f64>() - 0.5) * inst.ltp * volatility;
    let next  = inst.ltp + delta;

    inst.reprice(next, spread);
    inst.volume += rng.gen_range(0..MAX_TICK_VOLUME);
}

/// Steps every instrument in the book and queues one `Stock` event each, in
/// listing order.
pub fn step_prices<R: Rng>(
    book: &mut Book,
    rng: &mut R,
    config: &MarketConfig,
    outbox: &mut Vec<MarketEvent>,
) {
    for inst in book.instruments_mut() {
        step_instrument(inst, rng, config.volatility, config.spread);
        trace!(symbol = %inst.symbol, ltp = inst.ltp, change = inst.change, "price step");
        outbox.push(MarketEvent::Stock(inst.clone()));
    }
}

/// Builds a depth ladder `levels` deep around the instrument's LTP, `step`
/// apart.  Unknown instruments get an empty ladder.
pub fn market_depth<R: Rng>(
    inst: Option<&Instrument>,
    rng: &mut R,
    levels: usize,
    step: f64,
) -> MarketDepth {
    let Some(inst) = inst else {
        return MarketDepth::default();
    };

    let mut level = |offset: f64| DepthLevel {
        price:    inst.ltp + offset,
        quantity: rng.gen_range(500..5_500),
        orders:   rng.gen_range(5..55),
    };

    let bids = (1..=levels).map(|i| level(-(i as f64) * step)).collect();
    let asks = (1..=levels).map(|i| level(i as f64 * step)).collect();

    MarketDepth { bids, asks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn step_keeps_derived_fields_consistent() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut inst = Instrument::flat("DEMO", 100.0, 0.05);

        for _ in 0..500 {
            let (prev_high, prev_low, prev_volume) = (inst.high, inst.low, inst.volume);
            step_instrument(&mut inst, &mut rng, 0.002, 0.05);

            assert!(inst.high >= prev_high);
            assert!(inst.low <= prev_low);
            assert!(inst.high >= inst.ltp && inst.low <= inst.ltp);
            assert_eq!(inst.change, inst.ltp - inst.open);
            assert!(inst.volume - prev_volume < MAX_TICK_VOLUME);
        }
    }

    #[test]
    fn single_step_is_bounded_by_half_volatility() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut inst = Instrument::flat("DEMO", 100.0, 0.05);
        step_instrument(&mut inst, &mut rng, 0.002, 0.05);

        assert!((inst.ltp - 100.0).abs() <= 100.0 * 0.002 * 0.5);
        assert!(inst.high >= inst.ltp.max(100.0));
        assert!(inst.low <= inst.ltp.min(100.0));
    }

    #[test]
    fn same_seed_same_walk() {
        let walk = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut inst = Instrument::flat("DEMO", 100.0, 0.05);
            (0..20).map(|_| {
                step_instrument(&mut inst, &mut rng, 0.002, 0.05);
                inst.ltp
            }).collect::<Vec<_>>()
        };
        assert_eq!(walk(9), walk(9));
        assert_ne!(walk(9), walk(10));
    }

    #[test]
    fn depth_ladder_steps_away_from_ltp() {
        let mut rng = StdRng::seed_from_u64(5);
        let inst = Instrument::flat("DEMO", 100.0, 0.05);
        let depth = market_depth(Some(&inst), &mut rng, 5, 0.5);

        let bid_prices: Vec<_> = depth.bids.iter().map(|l| l.price).collect();
        let ask_prices: Vec<_> = depth.asks.iter().map(|l| l.price).collect();
        assert_eq!(bid_prices, [99.5, 99.0, 98.5, 98.0, 97.5]);
        assert_eq!(ask_prices, [100.5, 101.0, 101.5, 102.0, 102.5]);

        for level in depth.bids.iter().chain(&depth.asks) {
            assert!((500..5_500).contains(&level.quantity));
            assert!((5..55).contains(&level.orders));
        }
    }

    #[test]
    fn unknown_instrument_has_empty_depth() {
        let mut rng = StdRng::seed_from_u64(5);
        assert!(market_depth(None, &mut rng, 5, 0.5).is_empty());
    }
}
