//! Normalized dataset types shared by every stage after ingestion.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::gex::error::GexError;

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OptionRight {
    /// Call option.
    Call,
    /// Put option.
    Put,
}

impl OptionRight {
    /// Parses a right marker (`C`, `P`, `call`, `put`, any case).
    #[must_use]
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker.trim().to_ascii_uppercase().as_str() {
            "C" | "CALL" => Some(Self::Call),
            "P" | "PUT" => Some(Self::Put),
            _ => None,
        }
    }

    /// Applies the exposure sign convention: puts subtract.
    #[must_use]
    pub fn signed(self, exposure: f64) -> f64 {
        match self {
            Self::Call => exposure,
            Self::Put => -exposure,
        }
    }
}

impl std::fmt::Display for OptionRight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "C"),
            Self::Put => write!(f, "P"),
        }
    }
}

/// Which input schema a dataset was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    /// Array of per-contract records.
    Legacy,
    /// Single market snapshot with encoded option identifiers.
    Snapshot,
}

impl std::fmt::Display for PayloadFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Snapshot => write!(f, "snapshot"),
        }
    }
}

/// Composite aggregation key.
///
/// Strikes are held in thousandths so the key is totally ordered and hashable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StrikeKey {
    /// Expiration date as found in the payload.
    pub expiration: String,
    /// Strike in thousandths.
    pub strike_mills: u64,
}

impl StrikeKey {
    /// Builds a key from an expiration and a floating strike.
    #[must_use]
    pub fn new(expiration: &str, strike: f64) -> Self {
        Self {
            expiration: expiration.to_string(),
            strike_mills: strike_to_mills(strike),
        }
    }
}

/// Converts a strike to integer thousandths.
#[must_use]
pub fn strike_to_mills(strike: f64) -> u64 {
    (strike * 1000.0).round().max(0.0) as u64
}

/// Aggregated gamma exposure at one (expiration, strike).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NormalizedStrikePoint {
    /// Strike price.
    pub strike: f64,
    /// Expiration date; absent for legacy points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
    /// Underlying price when the point was observed.
    pub underlying_price: f64,
    /// Signed total gamma exposure (calls minus puts).
    pub gamma_exposure: f64,
    /// Call gamma exposure (snapshot only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_gamma: Option<f64>,
    /// Put gamma exposure, already negative (snapshot only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put_gamma: Option<f64>,
    /// Call open interest (snapshot only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_open_interest: Option<f64>,
    /// Put open interest (snapshot only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put_open_interest: Option<f64>,
    /// Call implied volatility (snapshot only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_iv: Option<f64>,
    /// Put implied volatility (snapshot only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put_iv: Option<f64>,
}

impl NormalizedStrikePoint {
    /// Creates an empty point with no exposure.
    #[must_use]
    pub fn new(strike: f64, expiration: Option<String>, underlying_price: f64) -> Self {
        Self {
            strike,
            expiration,
            underlying_price,
            gamma_exposure: 0.0,
            call_gamma: None,
            put_gamma: None,
            call_open_interest: None,
            put_open_interest: None,
            call_iv: None,
            put_iv: None,
        }
    }

    /// Open interest and implied volatility for one side, if both are usable
    /// for re-pricing.
    ///
    /// Absence is not the same as zero here: a side with no data is skipped.
    #[must_use]
    pub fn pricing_inputs(&self, right: OptionRight) -> Option<(f64, f64)> {
        let (oi, iv) = match right {
            OptionRight::Call => (self.call_open_interest, self.call_iv),
            OptionRight::Put => (self.put_open_interest, self.put_iv),
        };
        match (oi, iv) {
            (Some(oi), Some(iv)) if oi > 0.0 && iv > 0.0 => Some((oi, iv)),
            _ => None,
        }
    }
}

/// Closed strike interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StrikeWindow {
    /// Lower bound (inclusive).
    pub min: f64,
    /// Upper bound (inclusive).
    pub max: f64,
}

impl StrikeWindow {
    /// Creates a validated window.
    ///
    /// # Errors
    /// Returns `GexError::InvalidWindow` when a bound is not finite or
    /// `min > max`.
    pub fn new(min: f64, max: f64) -> Result<Self, GexError> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(GexError::InvalidWindow { min, max });
        }
        Ok(Self { min, max })
    }

    /// Window spanning the given fractions of a reference price.
    ///
    /// # Errors
    /// Same conditions as [`StrikeWindow::new`].
    pub fn around(price: f64, lower: f64, upper: f64) -> Result<Self, GexError> {
        Self::new(price * lower, price * upper)
    }

    /// Whether `strike` lies inside the closed interval.
    #[must_use]
    pub fn contains(&self, strike: f64) -> bool {
        strike >= self.min && strike <= self.max
    }
}

/// The immutable result of ingesting one payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedDataset {
    /// Earliest expiration in the dataset.
    pub reference_date: String,
    /// Underlying symbol.
    pub symbol: String,
    /// All points, ordered by expiration then strike.
    pub points: Vec<NormalizedStrikePoint>,
    /// Reference underlying price (first valid record).
    pub underlying_price: f64,
    /// Distinct expirations, ascending.
    pub expirations: Vec<String>,
    /// Points grouped by expiration.
    pub by_expiration: BTreeMap<String, Vec<NormalizedStrikePoint>>,
    /// Source schema.
    pub format: PayloadFormat,
    /// Sum of all signed exposure in billions (snapshot only).
    pub total_gamma_bn: Option<f64>,
}

impl ProcessedDataset {
    /// Total number of aggregated points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Points at one expiration, if present.
    #[must_use]
    pub fn points_at(&self, expiration: &str) -> Option<&[NormalizedStrikePoint]> {
        self.by_expiration.get(expiration).map(Vec::as_slice)
    }
}
