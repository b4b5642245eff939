// Copyright 2026 Hypermesh Foundation. All rights reserved.
// CrashGame RTP Engine - Stage Statistics

//! Per-stage RTP statistics, simulated (Monte Carlo) and analytical.
//!
//! Success at a stage pays `multiplier × bet`; failure pays nothing. All
//! figures are reported per unit bet.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::rng::Mulberry32;
use crate::types::{validate_multiplier, validate_probability, Dispersion};

/// z-score of a two-sided 95% interval.
pub const Z_95: f64 = 1.96;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageStats {
    pub mean_rtp: f64,
    pub std_dev: f64,
    pub success_rate: f64,
    pub ci_low: f64,
    pub ci_high: f64,
}

impl StageStats {
    fn with_interval(mean_rtp: f64, std_dev: f64, success_rate: f64, rounds: u64) -> Self {
        let half_width = Z_95 * std_dev / (rounds as f64).sqrt();
        Self {
            mean_rtp,
            std_dev,
            success_rate,
            ci_low: mean_rtp - half_width,
            ci_high: mean_rtp + half_width,
        }
    }
}

/// Monte Carlo estimate over `rounds` trials drawn from `rng`.
///
/// The generator is advanced by exactly `rounds` draws, so a caller sharing one
/// stream across stages gets a reproducible sequence of results.
pub fn simulate_stage(
    multiplier: f64,
    success_probability: f64,
    rounds: u64,
    bet: f64,
    dispersion: Dispersion,
    rng: &mut Mulberry32,
) -> Result<StageStats, EngineError> {
    validate_inputs(multiplier, success_probability, rounds, bet)?;

    let p = success_probability;
    let mut successes: u64 = 0;
    for _ in 0..rounds {
        if rng.next_f64() < p {
            successes += 1;
        }
    }

    let n = rounds as f64;
    let mean_payout = (successes as f64 * multiplier * bet) / n;
    let mean_rtp = mean_payout / bet;
    let success_rate = successes as f64 / n;
    let std_dev = match dispersion {
        Dispersion::Bernoulli => (bernoulli_spread(p) * multiplier * bet) / bet,
        Dispersion::Sample => sample_std_dev(success_rate, rounds) * multiplier,
    };

    Ok(StageStats::with_interval(mean_rtp, std_dev, success_rate, rounds))
}

/// Closed-form expectation. Consumes no randomness.
pub fn analytical_stage(
    multiplier: f64,
    success_probability: f64,
    rounds: u64,
    bet: f64,
) -> Result<StageStats, EngineError> {
    validate_inputs(multiplier, success_probability, rounds, bet)?;

    let p = success_probability;
    let mean_rtp = p * multiplier;
    let std_dev = bernoulli_spread(p) * multiplier;
    Ok(StageStats::with_interval(mean_rtp, std_dev, p, rounds))
}

pub(crate) fn validate_bet(bet: f64) -> Result<(), EngineError> {
    if !bet.is_finite() || bet <= 0.0 {
        return Err(EngineError::invalid(format!("bet must be finite and > 0, got {bet}")));
    }
    Ok(())
}

fn validate_inputs(multiplier: f64, p: f64, rounds: u64, bet: f64) -> Result<(), EngineError> {
    if rounds == 0 {
        return Err(EngineError::invalid("rounds must be >= 1"));
    }
    validate_bet(bet)?;
    validate_multiplier(multiplier)?;
    validate_probability(p)
}

fn bernoulli_spread(p: f64) -> f64 {
    (p * (1.0 - p)).sqrt()
}

/// Sample standard deviation of `rounds` Bernoulli outcomes with rate `rate`.
fn sample_std_dev(rate: f64, rounds: u64) -> f64 {
    if rounds < 2 {
        return 0.0;
    }
    let n = rounds as f64;
    (n / (n - 1.0) * rate * (1.0 - rate)).sqrt()
}
