// Coverage Report Types
// Structured output of the Monte Carlo confidence-interval coverage check

use serde::Serialize;

use crashgame_engine::stats::Z_95;
use crashgame_engine::{Deck, DeckBreakdown, RoundsSummary};

// ─── Coverage ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct CoverageRun {
    pub seed: u32,
    pub mean_rtp: f64,
    pub ci_low: f64,
    pub ci_high: f64,
    pub covered: bool,
}

/// Spread of per-run mean RTP around the analytical value.
#[derive(Debug, Clone, Serialize)]
pub struct RtpSpread {
    pub mean: f64,
    pub std_error: f64,
    pub ci_low: f64,
    pub ci_high: f64,
    pub lowest: f64,
    pub highest: f64,
}

impl RtpSpread {
    /// `None` when there are no runs.
    pub fn of_runs(runs: &[CoverageRun]) -> Option<Self> {
        let n = runs.len();
        if n == 0 {
            return None;
        }
        let (sum, lowest, highest) = runs.iter().fold(
            (0.0, f64::INFINITY, f64::NEG_INFINITY),
            |(sum, lo, hi), r| (sum + r.mean_rtp, lo.min(r.mean_rtp), hi.max(r.mean_rtp)),
        );
        let mean = sum / n as f64;
        let std_error = if n > 1 {
            let ss: f64 = runs.iter().map(|r| (r.mean_rtp - mean).powi(2)).sum();
            (ss / (n - 1) as f64 / n as f64).sqrt()
        } else {
            0.0
        };
        Some(Self {
            mean,
            std_error,
            ci_low: mean - Z_95 * std_error,
            ci_high: mean + Z_95 * std_error,
            lowest,
            highest,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CoverageReport {
    pub timestamp: String,
    pub prng: &'static str,
    pub multiplier: f64,
    pub success_probability: f64,
    pub rounds: u64,
    pub expected_rtp: f64,
    pub n_runs: usize,
    pub coverage_rate: f64,
    pub pass: bool,
    pub spread: Option<RtpSpread>,
    pub runs: Vec<CoverageRun>,
}

// ─── Console Tables ─────────────────────────────────────────────────────────

pub fn print_rounds_summary(name: &str, summary: &[RoundsSummary]) {
    println!("  {name}");
    println!("  {:>12} {:>12} {:>7}", "Rounds", "Mean RTP", "Stages");
    for row in summary {
        println!("  {:>12} {:>12.6} {:>7}", row.rounds, row.mean_rtp, row.stages);
    }
    println!();
}

pub fn print_deck_table(decks: &[Deck], rows: &[DeckBreakdown], global_scale: f64, overall: f64) {
    println!("  {:<20} {:>8} {:>8} {:>8} {:>10}", "Deck", "Weight", "Share", "Local", "RTP");
    println!("  {}", "-".repeat(58));
    for (deck, row) in decks.iter().zip(rows) {
        println!(
            "  {:<20} {:>8.3} {:>7.1}% {:>8.3} {:>10.4}",
            row.name,
            deck.selection_weight,
            row.weight_share * 100.0,
            deck.local_scale,
            row.expected_value,
        );
    }
    println!("  {}", "-".repeat(58));
    println!("  Global scale: {global_scale:.3}   Overall RTP: {overall:.4}\n");
}
