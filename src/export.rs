// Copyright 2026 Hypermesh Foundation. All rights reserved.
// CrashGame RTP Engine - Result Export

use std::io::{self, Write};

use crate::error::IngestError;
use crate::types::StageResult;

/// Column header of an exported result table.
pub const RESULT_HEADER: [&str; 9] = [
    "Stage",
    "Multiplier",
    "P_black",
    "Rounds",
    "Sim_RTP",
    "Sim_StdDev",
    "Success_Rate",
    "CI_low",
    "CI_high",
];

/// Write `rows` as CSV in the given order. A header is written even when
/// there are no rows.
pub fn write_results_csv<W: Write>(writer: W, rows: &[StageResult]) -> Result<(), IngestError> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(RESULT_HEADER)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn results_to_csv(rows: &[StageResult]) -> Result<String, IngestError> {
    let mut buf = Vec::new();
    write_results_csv(&mut buf, rows)?;
    String::from_utf8(buf).map_err(|e| IngestError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

pub fn results_to_json(rows: &[StageResult]) -> Result<String, IngestError> {
    Ok(serde_json::to_string_pretty(rows)?)
}
