// Copyright 2026 Hypermesh Foundation. All rights reserved.
// CrashGame RTP Engine - Deck Aggregation

//! Closed-form expected value of weighted decks.
//!
//! A deck's EV is the unweighted mean over its stages of
//! `p × (m × local_scale × global_scale)`. The overall EV is the convex
//! combination of deck EVs by selection weight, negative weights counting as 0.

use crate::types::{AggregationContext, Deck, DeckBreakdown, Stage};

/// Scaled expected value of a single step.
pub fn step_expected_value(stage: &Stage, local_scale: f64, global_scale: f64) -> f64 {
    stage.success_probability * (stage.multiplier * local_scale * global_scale)
}

/// Mean scaled EV across the deck's stages; 0 for an empty deck.
pub fn deck_expected_value(deck: &Deck, global_scale: f64) -> f64 {
    if deck.config.is_empty() {
        return 0.0;
    }
    let sum: f64 = deck
        .config
        .iter()
        .map(|s| step_expected_value(s, deck.local_scale, global_scale))
        .sum();
    sum / deck.config.len() as f64
}

/// Weight-normalized EV across all decks at the context's global scale.
pub fn overall_expected_value(ctx: &AggregationContext) -> f64 {
    overall_expected_value_at(&ctx.decks, ctx.global_scale())
}

/// Overall EV of `decks` evaluated at an explicit global scale.
pub fn overall_expected_value_at(decks: &[Deck], global_scale: f64) -> f64 {
    let total_weight = total_weight(decks);
    if total_weight <= 0.0 {
        return 0.0;
    }
    decks
        .iter()
        .map(|d| (effective_weight(d) / total_weight) * deck_expected_value(d, global_scale))
        .sum()
}

/// Per-deck EV, step values and normalized selection share.
pub fn breakdown(ctx: &AggregationContext) -> Vec<DeckBreakdown> {
    let total_weight = total_weight(&ctx.decks);
    let global_scale = ctx.global_scale();
    ctx.decks
        .iter()
        .map(|deck| DeckBreakdown {
            name: deck.name.clone(),
            weight_share: if total_weight > 0.0 {
                effective_weight(deck) / total_weight
            } else {
                0.0
            },
            expected_value: deck_expected_value(deck, global_scale),
            step_values: deck
                .config
                .iter()
                .map(|s| step_expected_value(s, deck.local_scale, global_scale))
                .collect(),
        })
        .collect()
}

fn effective_weight(deck: &Deck) -> f64 {
    deck.selection_weight.max(0.0)
}

fn total_weight(decks: &[Deck]) -> f64 {
    decks.iter().map(effective_weight).sum()
}
