//! # catalog
//!
//! The default trading session: eight NSE instruments, three open intraday
//! positions, three long-term holdings and a funded account.  Opening quotes
//! are jittered around each base price with the supplied RNG, so a seeded
//! RNG yields the same session every time.

use rand::Rng;

use crate::book::Book;
use crate::models::{Funds, Holding, Instrument, Position};

/// `(symbol, base price, opening volume)`.
pub const INSTRUMENTS: &[(&str, f64, u64)] = &[
    ("NIFTY 50",      21_850.0, 125_000_000),
    ("RELIANCE",       2_456.0,   8_500_000),
    ("TCS",            3_678.0,   4_200_000),
    ("INFY",           1_542.0,   9_800_000),
    ("HDFC BANK",      1_623.0,  12_000_000),
    ("ICICI BANK",       942.0,  15_000_000),
    ("ITC",              456.0,  18_000_000),
    ("BHARTI AIRTEL",  1_234.0,   6_500_000),
];

/// `(symbol, signed qty, average price)`.
const POSITIONS: &[(&str, i64, f64)] = &[
    ("NIFTY 50", 50, 21_720.30),
    ("RELIANCE", 10,  2_433.35),
    ("TCS",      -5,  3_691.20),
];

/// `(symbol, qty, average price)`.
const HOLDINGS: &[(&str, u64, f64)] = &[
    ("INFY",      50,  1_480.00),
    ("HDFC BANK", 30,  1_590.00),
    ("ITC",      100,    465.00),
];

pub fn opening_funds() -> Funds {
    Funds {
        available_cash:   125_430.50,
        used_margin:       48_500.00,
        available_margin:  76_930.50,
        total_collateral: 125_430.50,
        opening_balance:  150_000.00,
    }
}

/// An opening quote for `symbol`: LTP within ±1% of `base`, high/low up to a
/// further 1% of `base` either side.
pub fn opening_quote<R: Rng>(
    rng: &mut R,
    symbol: &str,
    base: f64,
    volume: u64,
    spread: f64,
) -> Instrument {
    let change = (rng.gen::<f64>() - 0.5) * base * 0.02;
    let ltp    = base + change;

    Instrument {
        symbol:         symbol.to_string(),
        ltp,
        change,
        change_percent: change / base * 100.0,
        volume,
        high:           ltp + rng.gen::<f64>() * base * 0.01,
        low:            ltp - rng.gen::<f64>() * base * 0.01,
        open:           base,
        close:          base,
        bid:            ltp - spread,
        ask:            ltp + spread,
        bid_qty:        rng.gen_range(100..1_100),
        ask_qty:        rng.gen_range(100..1_100),
    }
}

/// Builds the default session.
pub fn default_book<R: Rng>(rng: &mut R, spread: f64) -> Book {
    let mut book = Book::new(opening_funds());

    for &(symbol, base, volume) in INSTRUMENTS {
        book.list(opening_quote(rng, symbol, base, volume, spread));
    }

    for &(symbol, qty, avg) in POSITIONS {
        let ltp = book.ltp(symbol).unwrap_or(avg);
        book.positions.push(Position::new(symbol, qty, avg, ltp));
    }

    for &(symbol, qty, avg) in HOLDINGS {
        let (ltp, open) = book
            .instrument(symbol)
            .map_or((avg, avg), |inst| (inst.ltp, inst.open));
        book.holdings.push(Holding::new(symbol, qty, avg, ltp, open));
    }

    book
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn default_book_lists_every_symbol_in_order() {
        let book = default_book(&mut StdRng::seed_from_u64(7), 0.05);

        let symbols: Vec<_> = book.instruments().iter().map(|i| i.symbol.as_str()).collect();
        let expected: Vec<_> = INSTRUMENTS.iter().map(|(s, _, _)| *s).collect();
        assert_eq!(symbols, expected);
        assert_eq!(book.positions.len(), 3);
        assert_eq!(book.holdings.len(), 3);
        assert!(book.orders.is_empty());
    }

    #[test]
    fn opening_quotes_bracket_the_ltp() {
        let book = default_book(&mut StdRng::seed_from_u64(7), 0.05);

        for (inst, &(_, base, _)) in book.instruments().iter().zip(INSTRUMENTS) {
            assert_eq!(inst.open, base);
            assert!((inst.ltp - base).abs() <= base * 0.01);
            assert!(inst.low <= inst.ltp && inst.ltp <= inst.high);
            assert!((100..1_100).contains(&inst.bid_qty));
        }
    }

    #[test]
    fn seeded_sessions_are_identical() {
        let a = default_book(&mut StdRng::seed_from_u64(42), 0.05);
        let b = default_book(&mut StdRng::seed_from_u64(42), 0.05);
        assert_eq!(a.instruments(), b.instruments());
    }

    #[test]
    fn positions_are_marked_to_opening_ltp() {
        let book = default_book(&mut StdRng::seed_from_u64(1), 0.05);
        let tcs = book.position("TCS").unwrap();
        let ltp = book.ltp("TCS").unwrap();

        assert_eq!(tcs.qty, -5);
        assert_eq!(tcs.pnl, (ltp - 3_691.20) * -5.0);
    }
}
