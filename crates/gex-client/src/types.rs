//! Request and response types for the gamma exposure API.

use serde::{Deserialize, Serialize};


// ============================================================================
// Health & Statistics
// ============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Global statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalStatsResponse {
    /// Number of datasets held by the server.
    pub dataset_count: usize,
    /// Aggregated points across all datasets.
    pub total_points: usize,
}

/// Error body returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Error code.
    pub code: String,
}

// ============================================================================
// Datasets
// ============================================================================

/// Input schema of an uploaded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    /// Array of per-contract records.
    Legacy,
    /// Market snapshot with encoded option identifiers.
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

/// Summary of one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Dataset identifier.
    pub id: String,
    /// Upload time (RFC 3339).
    pub uploaded_at: String,
    /// Underlying symbol.
    pub symbol: String,
    /// Source schema.
    pub format: PayloadFormat,
    /// Earliest expiration.
    pub reference_date: String,
    /// Reference underlying price.
    pub underlying_price: f64,
    /// Number of distinct expirations.
    pub expiration_count: usize,
    /// Number of aggregated points.
    pub point_count: usize,
    /// Total signed exposure in billions (snapshot only).
    #[serde(default)]
    pub total_gamma_bn: Option<f64>,
}

/// List of datasets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetsListResponse {
    /// Dataset summaries.
    pub datasets: Vec<DatasetSummary>,
}

/// A skipped snapshot entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeWarning {
    /// Position in the payload's option list.
    pub index: usize,
    /// Raw identifier, when present.
    #[serde(default)]
    pub symbol: Option<String>,
    /// Reason the entry was skipped.
    pub reason: String,
}

/// Response after uploading a payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// The stored dataset.
    pub dataset: DatasetSummary,
    /// Skipped snapshot entries.
    pub warnings: Vec<DecodeWarning>,
    /// Legacy records excluded by validation.
    pub skipped_records: usize,
}

/// Response after deleting a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Confirmation message.
    pub message: String,
}

/// List of expirations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpirationsListResponse {
    /// Expiration dates, ascending.
    pub expirations: Vec<String>,
}

// ============================================================================
// Strike Selection
// ============================================================================

/// Closed strike interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrikeWindow {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

/// Aggregated gamma exposure at one strike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikePoint {
    /// Strike price.
    pub strike: f64,
    /// Expiration date; absent for legacy points.
    #[serde(default)]
    pub expiration: Option<String>,
    /// Underlying price at observation.
    pub underlying_price: f64,
    /// Signed total gamma exposure.
    pub gamma_exposure: f64,
    /// Call gamma exposure.
    #[serde(default)]
    pub call_gamma: Option<f64>,
    /// Put gamma exposure.
    #[serde(default)]
    pub put_gamma: Option<f64>,
    /// Call open interest.
    #[serde(default)]
    pub call_open_interest: Option<f64>,
    /// Put open interest.
    #[serde(default)]
    pub put_open_interest: Option<f64>,
    /// Call implied volatility.
    #[serde(default)]
    pub call_iv: Option<f64>,
    /// Put implied volatility.
    #[serde(default)]
    pub put_iv: Option<f64>,
}

/// Query parameters for strikes and crossings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrikeQuery {
    /// Comma-separated expirations. `None` selects all; empty selects none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expirations: Option<String>,
    /// Lower strike bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_strike: Option<f64>,
    /// Upper strike bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_strike: Option<f64>,
}

impl StrikeQuery {
    /// Selects the given expirations.
    #[must_use]
    pub fn with_expirations<S: AsRef<str>>(mut self, expirations: &[S]) -> Self {
        let joined: Vec<&str> = expirations.iter().map(AsRef::as_ref).collect();
        self.expirations = Some(joined.join(","));
        self
    }

    /// Restricts strikes to `[min, max]`.
    #[must_use]
    pub fn with_window(mut self, min: f64, max: f64) -> Self {
        self.min_strike = Some(min);
        self.max_strike = Some(max);
        self
    }
}

/// Filtered strike points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrikesResponse {
    /// Applied window.
    pub window: StrikeWindow,
    /// Selected expirations.
    pub expirations: Vec<String>,
    /// Points, highest strike first.
    pub points: Vec<StrikePoint>,
}

/// Strikes preceding each sign change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossingsResponse {
    /// Applied window.
    pub window: StrikeWindow,
    /// Strikes, ascending.
    pub crossings: Vec<f64>,
}

// ============================================================================
// Gamma Profile
// ============================================================================

/// Query parameters for the profile endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileQuery {
    /// Lowest spot level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_strike: Option<f64>,
    /// Highest spot level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_strike: Option<f64>,
    /// Number of spot levels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels: Option<usize>,
    /// Valuation date, `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_of: Option<String>,
}

/// Aggregate gamma at one spot level, in billions per 1% move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfilePoint {
    /// Hypothetical spot.
    pub spot: f64,
    /// All expirations.
    pub total_gamma: f64,
    /// Excluding the nearest expiration.
    pub ex_next_expiry: f64,
    /// Excluding the nearest monthly expiration.
    pub ex_next_monthly: f64,
}

/// Gamma exposure profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    /// Underlying symbol.
    pub symbol: String,
    /// Valuation date.
    pub as_of: String,
    /// Spot range.
    pub window: StrikeWindow,
    /// Points in ascending spot order.
    pub points: Vec<ProfilePoint>,
    /// Spot where total gamma changes sign.
    #[serde(default)]
    pub flip_point: Option<f64>,
    /// Nearest expiration.
    #[serde(default)]
    pub nearest_expiration: Option<String>,
    /// Nearest monthly expiration.
    #[serde(default)]
    pub nearest_monthly_expiration: Option<String>,
}
