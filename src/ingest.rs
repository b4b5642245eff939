// Copyright 2026 Hypermesh Foundation. All rights reserved.
// CrashGame RTP Engine - Config Ingestion

//! Reads ladder configs from CSV tables with `Stage`, `Multiplier` and
//! `P_black` columns.
//!
//! Rows with a missing, unparseable or non-finite value are dropped. Rows that
//! parse but describe an invalid stage fail the whole read: the engine does
//! not clamp.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, IngestError};
use crate::types::{Config, Stage};

pub const STAGE_COLUMN: &str = "Stage";
pub const MULTIPLIER_COLUMN: &str = "Multiplier";
pub const PROBABILITY_COLUMN: &str = "P_black";

pub fn parse_config_csv(text: &str) -> Result<Config, IngestError> {
    read_config(text.as_bytes())
}

pub fn read_config<R: Read>(reader: R) -> Result<Config, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h == name);
    let (stage_idx, mult_idx, prob_idx) = match (
        position(STAGE_COLUMN),
        position(MULTIPLIER_COLUMN),
        position(PROBABILITY_COLUMN),
    ) {
        (Some(s), Some(m), Some(p)) => (s, m, p),
        (s, m, p) => {
            let missing = [(s, STAGE_COLUMN), (m, MULTIPLIER_COLUMN), (p, PROBABILITY_COLUMN)]
                .iter()
                .filter(|(idx, _)| idx.is_none())
                .map(|(_, name)| name.to_string())
                .collect();
            return Err(IngestError::MissingColumns(missing));
        }
    };

    let mut stages = Vec::new();
    let mut dropped = 0usize;
    for record in rdr.records() {
        let record = record?;
        let field = |idx: usize| record.get(idx).and_then(parse_finite);
        let (Some(order), Some(multiplier), Some(p)) =
            (field(stage_idx), field(mult_idx), field(prob_idx))
        else {
            dropped += 1;
            continue;
        };
        stages.push(Stage::new(stage_order(order)?, multiplier, p));
    }

    debug!(stages = stages.len(), dropped, "parsed config table");
    Ok(Config::new(stages)?)
}

pub fn read_config_file(path: &Path) -> Result<Config, IngestError> {
    read_config(File::open(path)?)
}

/// Every `*.csv` in `dir`, in file-name order, keyed by file stem.
pub fn read_config_dir(dir: &Path) -> Result<Vec<(String, Config)>, IngestError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .iter()
        .map(|path| {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok((name, read_config_file(path)?))
        })
        .collect()
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Integer part of a parsed `Stage` cell.
fn stage_order(value: f64) -> Result<u32, EngineError> {
    let order = value.trunc();
    if order < 1.0 || order > f64::from(u32::MAX) {
        return Err(EngineError::invalid(format!(
            "stage order must be a positive integer, got {value}"
        )));
    }
    Ok(order as u32)
}
