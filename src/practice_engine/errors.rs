//! Error types for the practice engine.
//!
//! Only configuration problems are errors. Sampler exhaustion, empty
//! submissions and malformed numeric answers are ordinary outcomes and never
//! surface as `Err`.

use thiserror::Error;

/// No factor path exists between two units in the exact or approximate tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("unknown conversion: {from} to {to}")]
    UnknownConversion { from: String, to: String },

    #[error("malformed conversion name: {0:?} (expected \"<from>_to_<to>\")")]
    MalformedName(String),
}

/// Problems found while loading curriculum parameter tables.
#[derive(Debug, Error)]
pub enum CurriculumError {
    #[error("curriculum JSON could not be parsed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("curriculum I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("curriculum record for {module:?} is not an object")]
    InvalidRecord { module: String },

    #[error("curriculum record for {module:?} has invalid level key {key:?} (expected 1-4)")]
    InvalidLevel { module: String, key: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown topic module: {0:?}")]
pub struct ParseTopicError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("level {0} is outside 1-4")]
pub struct ParseLevelError(pub i64);
