//! # config
//!
//! [`MarketConfig`]: the simulator's tunables, read from the environment by
//! [`MarketConfig::from_env`] (after `dotenvy` has loaded `.env`).
//!
//! | Variable               | Default | Meaning                                 |
//! |------------------------|---------|-----------------------------------------|
//! | `SIM_TICK_MS`          | `1000`  | Price tick period                       |
//! | `SIM_VOLATILITY`       | `0.002` | Relative size of one random-walk step   |
//! | `SIM_SPREAD`           | `0.05`  | Bid/ask offset from the LTP             |
//! | `SIM_FILL_DELAY_MS`    | `2000`  | Delay before a non-market order resolves|
//! | `SIM_FILL_PROBABILITY` | `0.9`   | Chance a delayed order completes        |
//! | `SIM_DEPTH_LEVELS`     | `5`     | Levels per side of market depth         |
//! | `SIM_DEPTH_STEP`       | `0.5`   | Price gap between depth levels          |
//! | `SIM_SEED`             | unset   | Fixed RNG seed for reproducible runs    |

use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct MarketConfig {
    pub tick_interval:    Duration,
    pub volatility:       f64,
    pub spread:           f64,
    pub fill_delay:       Duration,
    pub fill_probability: f64,
    pub depth_levels:     usize,
    pub depth_step:       f64,
    /// `None` seeds the RNG from OS entropy.
    pub seed:             Option<u64>,
}

impl MarketConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tick_interval:    Duration::from_millis(env_parse("SIM_TICK_MS", 1_000)),
            volatility:       env_parse("SIM_VOLATILITY", defaults.volatility),
            spread:           env_parse("SIM_SPREAD", defaults.spread),
            fill_delay:       Duration::from_millis(env_parse("SIM_FILL_DELAY_MS", 2_000)),
            fill_probability: env_parse("SIM_FILL_PROBABILITY", defaults.fill_probability)
                .clamp(0.0, 1.0),
            depth_levels:     env_parse("SIM_DEPTH_LEVELS", defaults.depth_levels),
            depth_step:       env_parse("SIM_DEPTH_STEP", defaults.depth_step),
            seed:             std::env::var("SIM_SEED").ok().and_then(|v| v.parse().ok()),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            tick_interval:    Duration::from_secs(1),
            volatility:       0.002,
            spread:           0.05,
            fill_delay:       Duration::from_secs(2),
            fill_probability: 0.9,
            depth_levels:     5,
            depth_step:       0.5,
            seed:             None,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
