// Copyright 2026 Hypermesh Foundation. All rights reserved.
// CrashGame RTP Engine - Error Types

use wasm_bindgen::JsValue;

/// Errors raised by the engine core (statistics, sweep, aggregation, fit).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("baseline RTP is {base}; set valid stage parameters before fitting a scale")]
    DegenerateBase { base: f64 },
}

impl EngineError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Errors raised while reading configs or writing result tables.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config is missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl From<EngineError> for JsValue {
    fn from(err: EngineError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

impl From<IngestError> for JsValue {
    fn from(err: IngestError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
