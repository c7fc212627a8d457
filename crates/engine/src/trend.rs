//! Seasonal baseline for the sales series
//!
//! Two full sine periods over the window, centred on 20k with a 5k swing:
//! `20000 + 5000 * sin(4π * i / (D - 1))`.

use std::f64::consts::PI;

pub const BASE_LEVEL: f64 = 20_000.0;
pub const SEASONAL_AMPLITUDE: f64 = 5_000.0;

/// Baseline value for each of `days` days. Deterministic.
pub fn base_curve(days: usize) -> Vec<f64> {
    match days {
        0 => Vec::new(),
        // A single point sits at phase 0
        1 => vec![BASE_LEVEL],
        _ => {
            let last = (days - 1) as f64;
            (0..days)
                .map(|i| BASE_LEVEL + SEASONAL_AMPLITUDE * (4.0 * PI * i as f64 / last).sin())
                .collect()
        }
    }
}
