// src/services/synthetic.rs
//! Placeholder intraday series for the stock overlay chart.
//!
//! There is no real intraday feed. The series is a random walk that ends at
//! the current price and roughly follows the day's percent change. It is
//! seeded from the symbol so the same stock draws the same chart.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Five-minute bars over a regular session plus the close.
pub const INTRADAY_POINTS: usize = 79;

const VOLATILITY: f64 = 0.002;

fn seed_for(symbol: &str) -> u64 {
    // FNV-1a
    symbol.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x0100_0000_01b3)
    })
}

pub fn intraday_series(symbol: &str, price: f64, change_percent: f64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed_for(symbol));
    let steps = (INTRADAY_POINTS - 1) as f64;
    let trend = change_percent / steps / 100.0;

    let mut series = vec![0.0; INTRADAY_POINTS];
    let mut value = price;
    for slot in series.iter_mut().rev() {
        *slot = value;
        let noise = (rng.random::<f64>() - 0.5) * 2.0 * VOLATILITY;
        value /= 1.0 + trend + noise;
    }
    series
}

/// Close implied by the current price and the day's percent change.
pub fn previous_close(price: f64, change_percent: f64) -> f64 {
    price / (1.0 + change_percent / 100.0)
}
