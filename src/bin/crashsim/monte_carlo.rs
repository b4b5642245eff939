// Confidence-Interval Coverage: N seeded sweeps of one stage
// Each run gets its own 32-bit seed drawn from a ChaCha8 stream on the base seed

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crashgame_engine::*;

use crate::report::{CoverageReport, CoverageRun, RtpSpread};

/// Share of runs whose interval must contain the analytical RTP.
pub const PASS_THRESHOLD: f64 = 0.933;

pub struct CoverageSpec {
    pub stage: Stage,
    pub rounds: u64,
    pub bet: f64,
    pub runs: usize,
    pub base_seed: u64,
}

/// Derive the per-run seeds for `spec`.
pub fn run_seeds(base_seed: u64, runs: usize) -> Vec<u32> {
    let mut rng = ChaCha8Rng::seed_from_u64(base_seed);
    (0..runs).map(|_| rng.gen::<u32>()).collect()
}

/// Sweep a single stage at a single rounds value with `seed`.
pub fn run_single(spec: &CoverageSpec, seed: u32) -> Result<CoverageRun, EngineError> {
    let request = SimulationRequest {
        config: Config::new(vec![spec.stage])?,
        rounds: vec![spec.rounds],
        seed,
        bet: spec.bet,
        mode: SimulationMode::Simulated,
        dispersion: Dispersion::Bernoulli,
    };
    let rows = simulate(&request)?;
    let row = rows
        .first()
        .ok_or_else(|| EngineError::InvalidArgument("sweep produced no rows".into()))?;
    Ok(CoverageRun {
        seed,
        mean_rtp: row.mean_rtp,
        ci_low: row.ci_low,
        ci_high: row.ci_high,
        covered: row.contains(spec.stage.expected_rtp()),
    })
}

pub fn run_coverage(spec: &CoverageSpec, timestamp: String) -> Result<CoverageReport, EngineError> {
    let mut runs = Vec::with_capacity(spec.runs);
    for seed in run_seeds(spec.base_seed, spec.runs) {
        let run = run_single(spec, seed)?;
        debug!(seed, covered = run.covered, mean_rtp = run.mean_rtp, "coverage run");
        runs.push(run);
    }

    let n = runs.len();
    let covered = runs.iter().filter(|r| r.covered).count();
    let coverage_rate = if n > 0 { covered as f64 / n as f64 } else { 0.0 };

    Ok(CoverageReport {
        timestamp,
        prng: "Mulberry32",
        multiplier: spec.stage.multiplier,
        success_probability: spec.stage.success_probability,
        rounds: spec.rounds,
        expected_rtp: spec.stage.expected_rtp(),
        n_runs: n,
        coverage_rate,
        pass: n > 0 && coverage_rate >= PASS_THRESHOLD,
        spread: RtpSpread::of_runs(&runs),
        runs,
    })
}
