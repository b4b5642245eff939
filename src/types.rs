// Copyright 2026 Hypermesh Foundation. All rights reserved.
// CrashGame RTP Engine - Type Definitions

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// ─── Stage ───────────────────────────────────────────────────────────────────

/// One rung of the ladder: success pays `multiplier × bet`, failure pays 0.
///
/// Field names on the wire are the config table's column names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    #[serde(rename = "Stage")]
    pub order: u32,
    #[serde(rename = "Multiplier")]
    pub multiplier: f64,
    #[serde(rename = "P_black")]
    pub success_probability: f64,
}

impl Stage {
    pub fn new(order: u32, multiplier: f64, success_probability: f64) -> Self {
        Self { order, multiplier, success_probability }
    }

    /// Closed-form RTP of this stage on its own (`p × m`).
    pub fn expected_rtp(&self) -> f64 {
        self.multiplier * self.success_probability
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.order == 0 {
            return Err(EngineError::invalid("stage order must be >= 1"));
        }
        validate_multiplier(self.multiplier)?;
        validate_probability(self.success_probability)
    }
}

pub(crate) fn validate_multiplier(m: f64) -> Result<(), EngineError> {
    if !m.is_finite() || m < 0.0 {
        return Err(EngineError::invalid(format!(
            "multiplier must be finite and >= 0, got {m}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_probability(p: f64) -> Result<(), EngineError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(EngineError::invalid(format!(
            "success probability must be within [0, 1], got {p}"
        )));
    }
    Ok(())
}

// ─── Config ──────────────────────────────────────────────────────────────────

/// Ladder stages sorted ascending by `order`, orders unique.
///
/// Every constructor (including deserialization) validates the stages, so a
/// `Config` in hand is always well-formed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Stage>", into = "Vec<Stage>")]
pub struct Config {
    stages: Vec<Stage>,
}

impl Config {
    pub fn new(mut stages: Vec<Stage>) -> Result<Self, EngineError> {
        for stage in &stages {
            stage.validate()?;
        }
        stages.sort_by_key(|s| s.order);
        if let Some(w) = stages.windows(2).find(|w| w[0].order == w[1].order) {
            return Err(EngineError::invalid(format!(
                "duplicate stage order {}",
                w[0].order
            )));
        }
        Ok(Self { stages })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter()
    }

    /// Append a stage after the last one (`order + 1`, multiplier 1.0, p 0.5).
    pub fn push_next_stage(&mut self) -> &Stage {
        let order = self.stages.last().map_or(1, |s| s.order + 1);
        self.stages.push(Stage::new(order, 1.0, 0.5));
        &self.stages[self.stages.len() - 1]
    }

    pub fn remove(&mut self, index: usize) -> Option<Stage> {
        if index < self.stages.len() {
            Some(self.stages.remove(index))
        } else {
            None
        }
    }

    /// Replace the stage at `index`. The config is left unchanged on error.
    pub fn replace(&mut self, index: usize, stage: Stage) -> Result<(), EngineError> {
        if index >= self.stages.len() {
            return Err(EngineError::invalid(format!("no stage at index {index}")));
        }
        let mut stages = self.stages.clone();
        stages[index] = stage;
        *self = Self::new(stages)?;
        Ok(())
    }
}

impl TryFrom<Vec<Stage>> for Config {
    type Error = EngineError;

    fn try_from(stages: Vec<Stage>) -> Result<Self, Self::Error> {
        Self::new(stages)
    }
}

impl From<Config> for Vec<Stage> {
    fn from(config: Config) -> Self {
        config.stages
    }
}

// ─── Simulation Request / Result ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationMode {
    #[default]
    Simulated,
    Analytical,
}

/// Standard deviation reported by simulated mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dispersion {
    /// `sqrt(p(1-p)) × m`, independent of the draws.
    #[default]
    Bernoulli,
    /// Sample standard deviation of the simulated payouts (n - 1 denominator).
    Sample,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub config: Config,
    pub rounds: Vec<u64>,
    pub seed: u32,
    pub bet: f64,
    pub mode: SimulationMode,
    #[serde(default)]
    pub dispersion: Dispersion,
}

impl Default for SimulationRequest {
    fn default() -> Self {
        Self {
            config: Config::empty(),
            rounds: vec![10_000, 100_000, 1_000_000],
            seed: 123,
            bet: 1.0,
            mode: SimulationMode::Simulated,
            dispersion: Dispersion::Bernoulli,
        }
    }
}

/// One row of the result table, per (rounds, stage) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    #[serde(rename = "Stage")]
    pub stage: u32,
    #[serde(rename = "Multiplier")]
    pub multiplier: f64,
    #[serde(rename = "P_black")]
    pub success_probability: f64,
    #[serde(rename = "Rounds")]
    pub rounds: u64,
    #[serde(rename = "Sim_RTP")]
    pub mean_rtp: f64,
    #[serde(rename = "Sim_StdDev")]
    pub std_dev: f64,
    #[serde(rename = "Success_Rate")]
    pub success_rate: f64,
    #[serde(rename = "CI_low")]
    pub ci_low: f64,
    #[serde(rename = "CI_high")]
    pub ci_high: f64,
}

impl StageResult {
    pub fn contains(&self, value: f64) -> bool {
        self.ci_low <= value && value <= self.ci_high
    }
}

/// Mean simulated RTP across stages for one rounds value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoundsSummary {
    pub rounds: u64,
    pub mean_rtp: f64,
    pub stages: usize,
}

// ─── Decks ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub name: String,
    pub selection_weight: f64,
    pub local_scale: f64,
    pub config: Config,
}

impl Deck {
    pub fn new(name: impl Into<String>, config: Config) -> Self {
        Self {
            name: name.into(),
            selection_weight: 1.0,
            local_scale: 1.0,
            config,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.selection_weight = weight;
        self
    }

    pub fn with_local_scale(mut self, scale: f64) -> Self {
        self.local_scale = scale;
        self
    }
}

/// Decks plus the global multiplier scale they are evaluated under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationContext {
    pub decks: Vec<Deck>,
    global_scale: f64,
}

impl AggregationContext {
    pub fn new(decks: Vec<Deck>) -> Self {
        Self { decks, global_scale: 1.0 }
    }

    pub fn with_global_scale(decks: Vec<Deck>, global_scale: f64) -> Result<Self, EngineError> {
        let mut ctx = Self::new(decks);
        ctx.set_global_scale(global_scale)?;
        Ok(ctx)
    }

    pub fn global_scale(&self) -> f64 {
        self.global_scale
    }

    pub fn set_global_scale(&mut self, scale: f64) -> Result<(), EngineError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(EngineError::invalid(format!(
                "global scale must be finite and > 0, got {scale}"
            )));
        }
        self.global_scale = scale;
        Ok(())
    }
}

/// Per-deck figures under the context's current scales.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckBreakdown {
    pub name: String,
    pub weight_share: f64,
    pub expected_value: f64,
    pub step_values: Vec<f64>,
}
