#[cfg(test)]
mod tests {
    use crashgame_engine::aggregate::breakdown;
    use crashgame_engine::fit::{MAX_GLOBAL_SCALE, MIN_GLOBAL_SCALE};
    use crashgame_engine::presets::{default_decks, Preset};
    use crashgame_engine::*;

    fn deck(name: &str, stages: &[(u32, f64, f64)], weight: f64) -> Deck {
        let stages = stages.iter().map(|&(o, m, p)| Stage::new(o, m, p)).collect();
        Deck::new(name, Config::new(stages).unwrap()).with_weight(weight)
    }

    // ========== Empty Inputs ==========

    #[test]
    fn test_empty_deck_contributes_zero() {
        let empty = Deck::new("empty", Config::empty()).with_weight(1.0);
        assert_eq!(deck_expected_value(&empty, 1.0), 0.0);

        let ctx = AggregationContext::new(vec![empty, deck("a", &[(1, 2.0, 0.5)], 1.0)]);
        assert!((overall_expected_value(&ctx) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_all_weights_non_positive() {
        let ctx = AggregationContext::new(vec![
            deck("a", &[(1, 2.0, 0.5)], 0.0),
            deck("b", &[(1, 3.0, 0.9)], -1.0),
        ]);
        assert_eq!(overall_expected_value(&ctx), 0.0);
    }

    // ========== Weight Normalization ==========

    #[test]
    fn test_middle_zero_weight_ignored() {
        let a = deck("a", &[(1, 1.02, 0.95), (2, 1.07, 0.948)], 2.0);
        let c = deck("c", &[(1, 6.85, 0.166)], 2.0);
        let ev_a = deck_expected_value(&a, 1.0);
        let ev_c = deck_expected_value(&c, 1.0);

        for b_multiplier in [0.0, 1.0, 500.0] {
            let b = deck("b", &[(1, b_multiplier, 1.0)], 0.0);
            let ctx = AggregationContext::new(vec![a.clone(), b, c.clone()]);
            let expected = 0.5 * ev_a + 0.5 * ev_c;
            assert!((overall_expected_value(&ctx) - expected).abs() < 1e-12);
        }
    }

    // ========== Scale Linearity ==========

    #[test]
    fn test_overall_ev_linear_in_global_scale() {
        let base = AggregationContext::new(default_decks());
        let ev1 = overall_expected_value(&base);
        for k in [0.1, 0.5, 1.7, 3.0, 10.0] {
            let ctx = AggregationContext::with_global_scale(default_decks(), k).unwrap();
            let evk = overall_expected_value(&ctx);
            assert!((evk - k * ev1).abs() < 1e-9 * evk.abs().max(1.0));
        }
    }

    #[test]
    fn test_local_scale_only_touches_its_deck() {
        let mut decks = default_decks();
        let before: Vec<f64> = decks.iter().map(|d| deck_expected_value(d, 1.0)).collect();
        decks[2].local_scale = 2.0;
        let after: Vec<f64> = decks.iter().map(|d| deck_expected_value(d, 1.0)).collect();
        assert!((after[2] - 2.0 * before[2]).abs() < 1e-12);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[4], before[4]);
    }

    // ========== Scale Fit ==========

    #[test]
    fn test_fit_recovers_target() {
        let decks = vec![
            deck("a", &[(1, 1.02, 0.95), (2, 1.29, 0.885)], 1.0),
            deck("b", &[(1, 1.55, 0.91)], 3.0),
        ];
        let mut ctx = AggregationContext::with_global_scale(decks, 2.2).unwrap();
        let base = {
            let mut at_one = ctx.clone();
            at_one.set_global_scale(1.0).unwrap();
            overall_expected_value(&at_one)
        };
        for target in [0.9, 0.97, 1.2] {
            let scale = fit_global_scale(&ctx, target).unwrap();
            assert!((scale - target / base).abs() < 1e-12);
            ctx.set_global_scale(scale).unwrap();
            assert!((overall_expected_value(&ctx) - target).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fit_clamps_to_bounds() {
        let ctx = AggregationContext::new(vec![deck("a", &[(1, 1.0, 1.0)], 1.0)]);
        assert_eq!(fit_global_scale(&ctx, 50.0).unwrap(), MAX_GLOBAL_SCALE);
        assert_eq!(fit_global_scale(&ctx, 0.0).unwrap(), MIN_GLOBAL_SCALE);
    }

    #[test]
    fn test_degenerate_fit_leaves_scale() {
        let mut ctx = AggregationContext::with_global_scale(
            vec![deck("a", &[(1, 2.0, 0.0), (2, 5.0, 0.0)], 1.0), deck("b", &[(1, 9.0, 0.0)], 2.0)],
            0.8,
        )
        .unwrap();
        let err = apply_fitted_scale(&mut ctx, 0.97).unwrap_err();
        assert!(matches!(err, EngineError::DegenerateBase { base } if base == 0.0));
        assert_eq!(ctx.global_scale(), 0.8);
    }

    // ========== Default Board ==========

    #[test]
    fn test_default_board_breakdown() {
        let ctx = AggregationContext::new(default_decks());
        let rows = breakdown(&ctx);
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| (r.weight_share - 0.2).abs() < 1e-12));
        assert_eq!(rows[0].step_values.len(), 15);
        assert_eq!(rows[1].step_values.len(), 8);

        let first = deck_expected_value(&Deck::new("a", Preset::FirstAttempt.config()), 1.0);
        let chosen = deck_expected_value(&Deck::new("b", Preset::ChosenMoment.config()), 1.0);
        let expected = (4.0 * first + chosen) / 5.0;
        assert!((overall_expected_value(&ctx) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_deck_json_roundtrip_validates_config() {
        let decks = default_decks();
        let json = serde_json::to_string(&decks).unwrap();
        let back: Vec<Deck> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, decks);

        let bad = r#"[{"name":"x","selection_weight":1.0,"local_scale":1.0,
                      "config":[{"Stage":1,"Multiplier":2.0,"P_black":3.0}]}]"#;
        assert!(serde_json::from_str::<Vec<Deck>>(bad).is_err());
    }
}
