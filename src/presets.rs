// Copyright 2026 Hypermesh Foundation. All rights reserved.
// CrashGame RTP Engine - Sample Ladders

use serde::{Deserialize, Serialize};

use crate::types::{Config, Deck, Stage};

/// (Stage, Multiplier, P_black)
const FIRST_ATTEMPT: [(u32, f64, f64); 15] = [
    (1, 1.02, 0.95),
    (2, 1.07, 0.948),
    (3, 1.14, 0.944),
    (4, 1.29, 0.885),
    (5, 1.41, 0.912),
    (6, 1.55, 0.91),
    (7, 1.72, 0.9),
    (8, 1.94, 0.885),
    (9, 2.21, 0.88),
    (10, 2.58, 0.855),
    (11, 3.10, 0.835),
    (12, 3.88, 0.8),
    (13, 5.17, 0.75),
    (14, 7.76, 0.668),
    (15, 15.0, 0.5),
];

const CHOSEN_MOMENT: [(u32, f64, f64); 8] = [
    (1, 1.02, 0.95),
    (2, 1.07, 0.948),
    (3, 1.14, 0.944),
    (4, 6.85, 0.166),
    (5, 13.7, 0.502),
    (6, 32.01, 0.425),
    (7, 96.03, 0.337),
    (8, 500.0, 0.1925),
];

/// Built-in sample ladders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Fifteen gently rising rungs.
    FirstAttempt,
    /// Eight rungs with a steep jackpot tail.
    ChosenMoment,
}

impl Preset {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().replace('-', "_").as_str() {
            "first_attempt" | "a" => Some(Self::FirstAttempt),
            "chosen_moment" | "b" => Some(Self::ChosenMoment),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FirstAttempt => "first_attempt",
            Self::ChosenMoment => "chosen_moment",
        }
    }

    fn rows(&self) -> &'static [(u32, f64, f64)] {
        match self {
            Self::FirstAttempt => &FIRST_ATTEMPT,
            Self::ChosenMoment => &CHOSEN_MOMENT,
        }
    }

    pub fn config(&self) -> Config {
        let stages = self.rows().iter().map(|&(o, m, p)| Stage::new(o, m, p)).collect();
        Config::new(stages).unwrap_or_default()
    }
}

/// The five-deck board the browser page opens with: B plays the jackpot ladder.
pub fn default_decks() -> Vec<Deck> {
    ["A", "B", "C", "D", "E"]
        .iter()
        .map(|label| {
            let preset = if *label == "B" { Preset::ChosenMoment } else { Preset::FirstAttempt };
            Deck::new(format!("Deck {label}"), preset.config())
        })
        .collect()
}
