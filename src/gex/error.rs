//! Error and diagnostic types for the gamma exposure core.

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Fatal errors raised while ingesting a payload or deriving views from it.
#[derive(Debug, Error)]
pub enum GexError {
    /// The payload is not valid JSON.
    #[error("failed to parse payload: {0}")]
    Parse(#[from] serde_json::Error),

    /// The payload matches neither the legacy nor the snapshot schema.
    #[error("unrecognized payload format")]
    UnrecognizedFormat,

    /// The payload parsed but no usable records survived validation.
    #[error("payload contains no usable option records")]
    EmptyDataset,

    /// The strike window is inverted or not finite.
    #[error("invalid strike window: [{min}, {max}]")]
    InvalidWindow {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// The requested number of profile levels is too small.
    #[error("invalid profile level count: {0} (at least 2 required)")]
    InvalidLevels(usize),

    /// The requested number of profile levels exceeds the allowed maximum.
    #[error("too many profile levels: {requested} (at most {max} allowed)")]
    TooManyLevels {
        /// Requested level count.
        requested: usize,
        /// Largest accepted level count.
        max: usize,
    },
}

/// Reason a single encoded option identifier could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolDecodeError {
    /// Identifier is shorter than the fixed 15 character suffix.
    #[error("identifier too short: {0} characters")]
    TooShort(usize),
    /// Identifier contains non-ASCII characters.
    #[error("identifier is not ASCII")]
    NotAscii,
    /// The `YYMMDD` segment is not a calendar date.
    #[error("invalid expiration segment: {0}")]
    InvalidDate(String),
    /// The right marker is neither `C` nor `P`.
    #[error("invalid option right: {0}")]
    InvalidRight(char),
    /// The strike segment is not eight digits.
    #[error("invalid strike segment: {0}")]
    InvalidStrike(String),
}

/// Non-fatal diagnostic emitted when one snapshot entry is skipped.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SymbolDecodeWarning {
    /// Position of the entry in the payload's option list.
    pub index: usize,
    /// Raw identifier, when one was present.
    pub symbol: Option<String>,
    /// Human-readable reason.
    pub reason: String,
}

impl std::fmt::Display for SymbolDecodeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.symbol {
            Some(symbol) => write!(f, "entry {} ({}): {}", self.index, symbol, self.reason),
            None => write!(f, "entry {}: {}", self.index, self.reason),
        }
    }
}
