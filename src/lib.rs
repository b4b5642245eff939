// Copyright 2026 Hypermesh Foundation. All rights reserved.
// CrashGame RTP Engine

pub mod types;
pub mod error;
pub mod rng;
pub mod stats;
pub mod simulation;
pub mod aggregate;
pub mod fit;
pub mod presets;
pub mod board;

// Table I/O around the engine
pub mod ingest;
pub mod export;

pub use types::*;
pub use error::{EngineError, IngestError};
pub use rng::Mulberry32;
pub use simulation::{simulate, summarize_by_rounds};
pub use aggregate::{deck_expected_value, overall_expected_value};
pub use fit::{apply_fitted_scale, fit_global_scale};
pub use board::DeckBoard;

use wasm_bindgen::prelude::*;

use crate::presets::Preset;

// ─── WASM Interface ──────────────────────────────────────────────────────────

/// Sweep `config` (an array of `{Stage, Multiplier, P_black}`) and return the
/// result rows.
#[wasm_bindgen(js_name = runSim)]
pub fn run_sim(
    config: JsValue,
    rounds: &[u32],
    seed: i32,
    bet: f64,
    analytical: bool,
) -> Result<JsValue, JsValue> {
    let request = SimulationRequest {
        config: serde_wasm_bindgen::from_value(config)?,
        rounds: rounds.iter().map(|&r| u64::from(r)).collect(),
        seed: seed as u32,
        bet,
        mode: if analytical { SimulationMode::Analytical } else { SimulationMode::Simulated },
        dispersion: Dispersion::Bernoulli,
    };
    let rows = simulate(&request)?;
    Ok(serde_wasm_bindgen::to_value(&rows).unwrap_or(JsValue::NULL))
}

#[wasm_bindgen(js_name = parseConfigCsv)]
pub fn parse_config_csv_js(text: &str) -> Result<JsValue, JsValue> {
    let config = ingest::parse_config_csv(text)?;
    Ok(serde_wasm_bindgen::to_value(&config).unwrap_or(JsValue::NULL))
}

#[wasm_bindgen(js_name = resultsToCsv)]
pub fn results_to_csv_js(rows: JsValue) -> Result<String, JsValue> {
    let rows: Vec<StageResult> = serde_wasm_bindgen::from_value(rows)?;
    Ok(export::results_to_csv(&rows)?)
}

/// Mean `Sim_RTP` per rounds value, for the convergence chart.
#[wasm_bindgen(js_name = roundsSummary)]
pub fn rounds_summary_js(rows: JsValue) -> Result<JsValue, JsValue> {
    let rows: Vec<StageResult> = serde_wasm_bindgen::from_value(rows)?;
    Ok(serde_wasm_bindgen::to_value(&summarize_by_rounds(&rows)).unwrap_or(JsValue::NULL))
}

#[wasm_bindgen(js_name = sampleConfig)]
pub fn sample_config_js(name: &str) -> Result<JsValue, JsValue> {
    let preset = Preset::from_name(name)
        .ok_or_else(|| JsValue::from_str(&format!("unknown sample config {name:?}")))?;
    Ok(serde_wasm_bindgen::to_value(&preset.config()).unwrap_or(JsValue::NULL))
}

#[wasm_bindgen]
impl DeckBoard {
    #[wasm_bindgen(js_name = breakdown)]
    pub fn breakdown_js(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.breakdown()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = decks)]
    pub fn decks_js(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.decks()).unwrap_or(JsValue::NULL)
    }
}
