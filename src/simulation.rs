// Copyright 2026 Hypermesh Foundation. All rights reserved.
// CrashGame RTP Engine - Simulation Sweep

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::error::EngineError;
use crate::rng::Mulberry32;
use crate::stats::{analytical_stage, simulate_stage, validate_bet, StageStats};
use crate::types::*;

// ─── Sweep Driver ────────────────────────────────────────────────────────────

/// Run every (rounds, stage) pair of the request, rounds-major.
///
/// Simulated mode creates one generator from `request.seed` and advances it
/// across the whole sweep, so the same request always reproduces the same
/// table. Arguments are validated before any draw; on error nothing is
/// returned.
pub fn simulate(request: &SimulationRequest) -> Result<Vec<StageResult>, EngineError> {
    validate_request(request)?;
    debug!(
        stages = request.config.len(),
        rounds = ?request.rounds,
        seed = request.seed,
        mode = ?request.mode,
        "starting sweep"
    );

    let mut rng = Mulberry32::new(request.seed);
    let mut rows = Vec::with_capacity(request.rounds.len() * request.config.len());

    for &rounds in &request.rounds {
        for stage in request.config.iter() {
            let stats = match request.mode {
                SimulationMode::Simulated => simulate_stage(
                    stage.multiplier,
                    stage.success_probability,
                    rounds,
                    request.bet,
                    request.dispersion,
                    &mut rng,
                )?,
                SimulationMode::Analytical => analytical_stage(
                    stage.multiplier,
                    stage.success_probability,
                    rounds,
                    request.bet,
                )?,
            };
            rows.push(to_row(stage, rounds, stats));
        }
    }

    debug!(rows = rows.len(), "sweep finished");
    Ok(rows)
}

fn validate_request(request: &SimulationRequest) -> Result<(), EngineError> {
    validate_bet(request.bet)?;
    let mut seen = HashSet::with_capacity(request.rounds.len());
    for &rounds in &request.rounds {
        if rounds == 0 {
            return Err(EngineError::invalid("rounds must be >= 1"));
        }
        if !seen.insert(rounds) {
            return Err(EngineError::invalid(format!("duplicate rounds value {rounds}")));
        }
    }
    Ok(())
}

fn to_row(stage: &Stage, rounds: u64, stats: StageStats) -> StageResult {
    StageResult {
        stage: stage.order,
        multiplier: stage.multiplier,
        success_probability: stage.success_probability,
        rounds,
        mean_rtp: stats.mean_rtp,
        std_dev: stats.std_dev,
        success_rate: stats.success_rate,
        ci_low: stats.ci_low,
        ci_high: stats.ci_high,
    }
}

// ─── Convergence Summary ─────────────────────────────────────────────────────

/// Mean `Sim_RTP` across stages per rounds value, ascending by rounds.
pub fn summarize_by_rounds(rows: &[StageResult]) -> Vec<RoundsSummary> {
    let mut groups: BTreeMap<u64, (f64, usize)> = BTreeMap::new();
    for row in rows {
        let entry = groups.entry(row.rounds).or_insert((0.0, 0));
        entry.0 += row.mean_rtp;
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|(rounds, (sum, stages))| RoundsSummary {
            rounds,
            mean_rtp: sum / stages as f64,
            stages,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_stage_config() -> Config {
        Config::new(vec![
            Stage::new(1, 1.02, 0.95),
            Stage::new(2, 1.07, 0.948),
            Stage::new(3, 1.14, 0.944),
        ])
        .unwrap()
    }

    fn request(mode: SimulationMode) -> SimulationRequest {
        SimulationRequest {
            config: three_stage_config(),
            rounds: vec![100, 1000],
            seed: 123,
            bet: 1.0,
            mode,
            dispersion: Dispersion::Bernoulli,
        }
    }

    #[test]
    fn test_rows_are_rounds_major() {
        let rows = simulate(&request(SimulationMode::Analytical)).unwrap();
        let order: Vec<(u64, u32)> = rows.iter().map(|r| (r.rounds, r.stage)).collect();
        assert_eq!(
            order,
            vec![(100, 1), (100, 2), (100, 3), (1000, 1), (1000, 2), (1000, 3)]
        );
    }

    #[test]
    fn test_rounds_kept_in_given_order() {
        let mut req = request(SimulationMode::Analytical);
        req.rounds = vec![5000, 10];
        let rows = simulate(&req).unwrap();
        assert_eq!(rows[0].rounds, 5000);
        assert_eq!(rows[3].rounds, 10);
    }

    #[test]
    fn test_single_stream_shared_across_sweep() {
        // Known success counts with seed 123 when one stream spans all rows.
        let rows = simulate(&request(SimulationMode::Simulated)).unwrap();
        let counts: Vec<u64> = rows
            .iter()
            .map(|r| (r.success_rate * r.rounds as f64).round() as u64)
            .collect();
        assert_eq!(counts, vec![96, 93, 96, 953, 953, 943]);
    }

    #[test]
    fn test_simulated_is_reproducible() {
        let a = simulate(&request(SimulationMode::Simulated)).unwrap();
        let b = simulate(&request(SimulationMode::Simulated)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_changes_draws() {
        let a = simulate(&request(SimulationMode::Simulated)).unwrap();
        let mut req = request(SimulationMode::Simulated);
        req.seed = 124;
        let b = simulate(&req).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_rounds_fail_whole_sweep() {
        let mut req = request(SimulationMode::Simulated);
        req.rounds = vec![100, 0];
        assert!(matches!(simulate(&req), Err(EngineError::InvalidArgument(_))));

        req.rounds = vec![100, 100];
        assert!(simulate(&req).is_err());
    }

    #[test]
    fn test_invalid_bet_fails() {
        let mut req = request(SimulationMode::Analytical);
        req.bet = 0.0;
        assert!(simulate(&req).is_err());
        req.bet = f64::NAN;
        assert!(simulate(&req).is_err());
    }

    #[test]
    fn test_empty_inputs_give_empty_table() {
        let mut req = request(SimulationMode::Simulated);
        req.rounds.clear();
        assert!(simulate(&req).unwrap().is_empty());

        let mut req = request(SimulationMode::Simulated);
        req.config = Config::empty();
        assert!(simulate(&req).unwrap().is_empty());
    }

    #[test]
    fn test_summary_groups_by_rounds() {
        let mut req = request(SimulationMode::Analytical);
        req.rounds = vec![1000, 100];
        let rows = simulate(&req).unwrap();
        let summary = summarize_by_rounds(&rows);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].rounds, 100);
        assert_eq!(summary[1].rounds, 1000);
        assert_eq!(summary[0].stages, 3);
        let expected = (0.95 * 1.02 + 0.948 * 1.07 + 0.944 * 1.14) / 3.0;
        assert!((summary[0].mean_rtp - expected).abs() < 1e-12);
    }

    #[test]
    fn test_summary_of_nothing() {
        assert!(summarize_by_rounds(&[]).is_empty());
    }
}
