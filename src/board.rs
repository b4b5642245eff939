// Copyright 2026 Hypermesh Foundation. All rights reserved.
// CrashGame RTP Engine - Deck Board

//! Caller-owned deck editing state behind the browser page.
//!
//! Inputs coming from form fields are clamped here the way the page clamps
//! them (weights and local scales at 0, probabilities to [0, 1], the global
//! scale to the fit bounds). Everything below this layer validates instead.

use wasm_bindgen::prelude::*;

use crate::aggregate::{breakdown, deck_expected_value, overall_expected_value};
use crate::error::EngineError;
use crate::fit::{apply_fitted_scale, MAX_GLOBAL_SCALE, MIN_GLOBAL_SCALE};
use crate::presets::{default_decks, Preset};
use crate::types::{AggregationContext, Deck, DeckBreakdown, Stage};

#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct DeckBoard {
    context: AggregationContext,
}

impl Default for DeckBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl DeckBoard {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        Self::from_decks(default_decks())
    }

    pub fn deck_count(&self) -> usize {
        self.context.decks.len()
    }

    pub fn global_scale(&self) -> f64 {
        self.context.global_scale()
    }

    /// Clamped to the fit bounds; a non-numeric input resets to 1.0.
    pub fn set_global_scale(&mut self, scale: f64) -> Result<(), EngineError> {
        let scale = if scale.is_finite() { scale } else { 1.0 };
        self.context
            .set_global_scale(scale.clamp(MIN_GLOBAL_SCALE, MAX_GLOBAL_SCALE))
    }

    pub fn set_name(&mut self, deck: usize, name: &str) -> Result<(), EngineError> {
        self.deck_mut(deck)?.name = name.to_string();
        Ok(())
    }

    pub fn set_weight(&mut self, deck: usize, weight: f64) -> Result<(), EngineError> {
        self.deck_mut(deck)?.selection_weight = non_negative(weight);
        Ok(())
    }

    pub fn set_local_scale(&mut self, deck: usize, scale: f64) -> Result<(), EngineError> {
        self.deck_mut(deck)?.local_scale = non_negative(scale);
        Ok(())
    }

    pub fn set_stage_order(&mut self, deck: usize, row: usize, order: u32) -> Result<(), EngineError> {
        self.update_stage(deck, row, |s| s.order = order)
    }

    pub fn set_stage_multiplier(
        &mut self,
        deck: usize,
        row: usize,
        multiplier: f64,
    ) -> Result<(), EngineError> {
        self.update_stage(deck, row, |s| s.multiplier = multiplier)
    }

    pub fn set_stage_probability(
        &mut self,
        deck: usize,
        row: usize,
        probability: f64,
    ) -> Result<(), EngineError> {
        let p = if probability.is_finite() { probability.clamp(0.0, 1.0) } else { 0.0 };
        self.update_stage(deck, row, |s| s.success_probability = p)
    }

    pub fn add_row(&mut self, deck: usize) -> Result<(), EngineError> {
        self.deck_mut(deck)?.config.push_next_stage();
        Ok(())
    }

    pub fn delete_row(&mut self, deck: usize, row: usize) -> Result<(), EngineError> {
        self.deck_mut(deck)?
            .config
            .remove(row)
            .map(|_| ())
            .ok_or_else(|| EngineError::invalid(format!("no stage at index {row}")))
    }

    /// Replace a deck's stages with a sample ladder (`first_attempt` or `chosen_moment`).
    pub fn reset_deck(&mut self, deck: usize, preset: &str) -> Result<(), EngineError> {
        let preset = Preset::from_name(preset)
            .ok_or_else(|| EngineError::invalid(format!("unknown preset {preset:?}")))?;
        self.deck_mut(deck)?.config = preset.config();
        Ok(())
    }

    pub fn deck_ev(&self, deck: usize) -> Result<f64, EngineError> {
        let d = self
            .context
            .decks
            .get(deck)
            .ok_or_else(|| no_deck(deck))?;
        Ok(deck_expected_value(d, self.context.global_scale()))
    }

    pub fn overall_ev(&self) -> f64 {
        overall_expected_value(&self.context)
    }

    /// Fit the global scale to `target_rtp` and apply it. On error the scale is unchanged.
    pub fn fit_scale(&mut self, target_rtp: f64) -> Result<f64, EngineError> {
        apply_fitted_scale(&mut self.context, target_rtp)
    }
}

impl DeckBoard {
    pub fn from_decks(decks: Vec<Deck>) -> Self {
        Self { context: AggregationContext::new(decks) }
    }

    pub fn context(&self) -> &AggregationContext {
        &self.context
    }

    pub fn decks(&self) -> &[Deck] {
        &self.context.decks
    }

    pub fn breakdown(&self) -> Vec<DeckBreakdown> {
        breakdown(&self.context)
    }

    fn deck_mut(&mut self, deck: usize) -> Result<&mut Deck, EngineError> {
        self.context.decks.get_mut(deck).ok_or_else(|| no_deck(deck))
    }

    fn update_stage(
        &mut self,
        deck: usize,
        row: usize,
        edit: impl FnOnce(&mut Stage),
    ) -> Result<(), EngineError> {
        let config = &mut self.deck_mut(deck)?.config;
        let mut stage = *config
            .stages()
            .get(row)
            .ok_or_else(|| EngineError::invalid(format!("no stage at index {row}")))?;
        edit(&mut stage);
        config.replace(row, stage)
    }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

fn no_deck(deck: usize) -> EngineError {
    EngineError::invalid(format!("no deck at index {deck}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_board_has_five_decks() {
        let board = DeckBoard::new();
        assert_eq!(board.deck_count(), 5);
        assert_eq!(board.global_scale(), 1.0);
        assert!(board.overall_ev() > 0.0);
    }

    #[test]
    fn test_inputs_are_clamped() {
        let mut board = DeckBoard::new();
        board.set_weight(0, -2.0).unwrap();
        board.set_local_scale(0, f64::NAN).unwrap();
        assert_eq!(board.decks()[0].selection_weight, 0.0);
        assert_eq!(board.decks()[0].local_scale, 0.0);

        board.set_global_scale(9.0).unwrap();
        assert_eq!(board.global_scale(), MAX_GLOBAL_SCALE);
        board.set_global_scale(0.0).unwrap();
        assert_eq!(board.global_scale(), MIN_GLOBAL_SCALE);

        board.set_stage_probability(1, 0, 7.0).unwrap();
        assert_eq!(board.decks()[1].config.stages()[0].success_probability, 1.0);
    }

    #[test]
    fn test_bad_indices_are_errors() {
        let mut board = DeckBoard::new();
        assert!(board.set_weight(9, 1.0).is_err());
        assert!(board.deck_ev(9).is_err());
        assert!(board.delete_row(0, 99).is_err());
        assert!(board.set_stage_multiplier(0, 99, 1.0).is_err());
        assert!(board.reset_deck(0, "nope").is_err());
    }

    #[test]
    fn test_negative_multiplier_leaves_stage_alone() {
        let mut board = DeckBoard::new();
        let before = board.decks()[0].config.clone();
        assert!(board.set_stage_multiplier(0, 0, -1.0).is_err());
        assert_eq!(board.decks()[0].config, before);
    }

    #[test]
    fn test_row_editing() {
        let mut board = DeckBoard::new();
        board.reset_deck(2, "chosen_moment").unwrap();
        assert_eq!(board.decks()[2].config.len(), 8);
        board.add_row(2).unwrap();
        assert_eq!(board.decks()[2].config.stages()[8], Stage::new(9, 1.0, 0.5));
        board.delete_row(2, 0).unwrap();
        assert_eq!(board.decks()[2].config.len(), 8);
        assert_eq!(board.decks()[2].config.stages()[0].order, 2);
    }

    #[test]
    fn test_fit_scale_applies() {
        let mut board = DeckBoard::new();
        let scale = board.fit_scale(0.97).unwrap();
        assert_eq!(board.global_scale(), scale);
        if scale > MIN_GLOBAL_SCALE && scale < MAX_GLOBAL_SCALE {
            assert!((board.overall_ev() - 0.97).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fit_on_zero_weights_keeps_scale() {
        let mut board = DeckBoard::new();
        board.set_global_scale(1.3).unwrap();
        for i in 0..board.deck_count() {
            board.set_weight(i, 0.0).unwrap();
        }
        assert!(matches!(board.fit_scale(0.97), Err(EngineError::DegenerateBase { .. })));
        assert_eq!(board.global_scale(), 1.3);
    }
}
