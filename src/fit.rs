// Copyright 2026 Hypermesh Foundation. All rights reserved.
// CrashGame RTP Engine - Global Scale Fit

use tracing::{debug, warn};

use crate::aggregate::overall_expected_value_at;
use crate::error::EngineError;
use crate::types::AggregationContext;

/// Lower bound of a fitted global scale.
pub const MIN_GLOBAL_SCALE: f64 = 0.1;
/// Upper bound of a fitted global scale.
pub const MAX_GLOBAL_SCALE: f64 = 3.0;

/// Global scale that brings the overall EV to `target_rtp`.
///
/// Overall EV is linear in the global scale, so the answer is
/// `target / base` where `base` is the EV at scale 1.0, clamped to
/// [`MIN_GLOBAL_SCALE`, `MAX_GLOBAL_SCALE`]. The context is not modified.
pub fn fit_global_scale(ctx: &AggregationContext, target_rtp: f64) -> Result<f64, EngineError> {
    if !target_rtp.is_finite() {
        return Err(EngineError::invalid(format!("target RTP must be finite, got {target_rtp}")));
    }
    let base = overall_expected_value_at(&ctx.decks, 1.0);
    if base <= 0.0 {
        warn!(base, target_rtp, "cannot fit global scale against a degenerate baseline");
        return Err(EngineError::DegenerateBase { base });
    }
    let scale = (target_rtp / base).clamp(MIN_GLOBAL_SCALE, MAX_GLOBAL_SCALE);
    debug!(base, target_rtp, scale, "fitted global scale");
    Ok(scale)
}

/// Fit and store the global scale. On error the prior scale is kept.
pub fn apply_fitted_scale(ctx: &mut AggregationContext, target_rtp: f64) -> Result<f64, EngineError> {
    let scale = fit_global_scale(ctx, target_rtp)?;
    ctx.set_global_scale(scale)?;
    Ok(scale)
}
